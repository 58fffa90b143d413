use thiserror::Error;

/// XP granted for each correct answer.
pub const XP_PER_CORRECT: u64 = 5;
/// Size of one level bucket.
pub const XP_PER_LEVEL: u64 = 30;
/// One-time XP granted the first time a lesson is completed.
pub const LESSON_COMPLETION_XP: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("xp per level must be > 0")]
    InvalidXpPerLevel,
}

/// XP economy shared by the stats store and quiz sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    xp_per_correct: u64,
    xp_per_level: u64,
    lesson_completion_xp: u64,
}

impl GameRules {
    /// # Errors
    ///
    /// Returns `RulesError::InvalidXpPerLevel` if `xp_per_level` is zero.
    pub fn new(
        xp_per_correct: u64,
        xp_per_level: u64,
        lesson_completion_xp: u64,
    ) -> Result<Self, RulesError> {
        if xp_per_level == 0 {
            return Err(RulesError::InvalidXpPerLevel);
        }
        Ok(Self {
            xp_per_correct,
            xp_per_level,
            lesson_completion_xp,
        })
    }

    #[must_use]
    pub fn xp_per_correct(&self) -> u64 {
        self.xp_per_correct
    }

    #[must_use]
    pub fn xp_per_level(&self) -> u64 {
        self.xp_per_level
    }

    #[must_use]
    pub fn lesson_completion_xp(&self) -> u64 {
        self.lesson_completion_xp
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            xp_per_correct: XP_PER_CORRECT,
            xp_per_level: XP_PER_LEVEL,
            lesson_completion_xp: LESSON_COMPLETION_XP,
        }
    }
}
