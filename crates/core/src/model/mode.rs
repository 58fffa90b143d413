use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Delay between answer feedback and the next question in auto-advance modes.
pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(1000);
/// Lives granted at the start of a challenge run.
pub const CHALLENGE_STARTING_LIVES: u32 = 3;
/// Time budget per question for the speed bonus.
pub const SPEEDRUN_SECONDS_PER_QUESTION: u64 = 10;
/// Bonus XP per life left at the end of a challenge run.
pub const SURVIVAL_XP_PER_LIFE: u64 = 5;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz mode: {0}")]
pub struct ParseModeError(pub String);

/// How a lesson is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Shows the explanation and waits for the player to continue.
    #[default]
    Learn,
    /// Auto-advances with celebratory feedback cues.
    Fun,
    /// Auto-advances; finishing under the time budget earns bonus XP.
    Speedrun,
    /// Auto-advances with a limited number of lives; survivors earn bonus XP.
    Challenge,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Learn, Mode::Fun, Mode::Speedrun, Mode::Challenge];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Learn => "learn",
            Mode::Fun => "fun",
            Mode::Speedrun => "speedrun",
            Mode::Challenge => "challenge",
        }
    }

    /// Default strategy for this mode.
    #[must_use]
    pub fn policy(self) -> ModePolicy {
        let auto = AdvancePolicy::AutoAfter(DEFAULT_AUTO_ADVANCE);
        match self {
            Mode::Learn => ModePolicy {
                advance: AdvancePolicy::Manual,
                bonus: BonusPolicy::None,
                starting_lives: None,
                feedback_cues: false,
            },
            Mode::Fun => ModePolicy {
                advance: auto,
                bonus: BonusPolicy::None,
                starting_lives: None,
                feedback_cues: true,
            },
            Mode::Speedrun => ModePolicy {
                advance: auto,
                bonus: BonusPolicy::Speed {
                    seconds_per_question: SPEEDRUN_SECONDS_PER_QUESTION,
                },
                starting_lives: None,
                feedback_cues: false,
            },
            Mode::Challenge => ModePolicy {
                advance: auto,
                bonus: BonusPolicy::Survival {
                    xp_per_life: SURVIVAL_XP_PER_LIFE,
                },
                starting_lives: Some(CHALLENGE_STARTING_LIVES),
                feedback_cues: false,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learn" => Ok(Mode::Learn),
            "fun" => Ok(Mode::Fun),
            "speedrun" => Ok(Mode::Speedrun),
            "challenge" => Ok(Mode::Challenge),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// When an answered question moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Move on automatically once the delay elapses.
    AutoAfter(Duration),
    /// Wait for an explicit confirmation.
    Manual,
}

/// Auxiliary value a bonus is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusMetric {
    Elapsed(chrono::Duration),
    LivesRemaining(u32),
}

/// Completion bonus rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusPolicy {
    None,
    /// Half a point per whole second left in a `total * seconds_per_question` budget.
    Speed { seconds_per_question: u64 },
    /// Flat XP per remaining life.
    Survival { xp_per_life: u64 },
}

impl BonusPolicy {
    /// Bonus XP for a completed lesson. A metric that does not match the
    /// policy yields 0.
    #[must_use]
    pub fn bonus(&self, total_questions: usize, metric: Option<BonusMetric>) -> u64 {
        match (self, metric) {
            (
                BonusPolicy::Speed {
                    seconds_per_question,
                },
                Some(BonusMetric::Elapsed(elapsed)),
            ) => speed_bonus(total_questions, *seconds_per_question, elapsed),
            (BonusPolicy::Survival { xp_per_life }, Some(BonusMetric::LivesRemaining(lives))) => {
                survival_bonus(lives, *xp_per_life)
            }
            _ => 0,
        }
    }
}

/// Speed bonus: half of the whole seconds left in the time budget.
#[must_use]
pub fn speed_bonus(
    total_questions: usize,
    seconds_per_question: u64,
    elapsed: chrono::Duration,
) -> u64 {
    let total = u64::try_from(total_questions).unwrap_or(u64::MAX);
    let budget = total.saturating_mul(seconds_per_question);
    let spent = u64::try_from(elapsed.num_seconds()).unwrap_or(0);
    budget.saturating_sub(spent) / 2
}

/// Survival bonus: flat XP per remaining life.
#[must_use]
pub fn survival_bonus(lives_remaining: u32, xp_per_life: u64) -> u64 {
    u64::from(lives_remaining).saturating_mul(xp_per_life)
}

/// Per-mode strategy: advance behaviour, bonus rule, and lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub advance: AdvancePolicy,
    pub bonus: BonusPolicy,
    /// `Some` enables the lives mechanic.
    pub starting_lives: Option<u32>,
    /// Emit celebrate / shake cues with answer feedback.
    pub feedback_cues: bool,
}

impl ModePolicy {
    /// Override the auto-advance delay. Manual policies are left unchanged.
    #[must_use]
    pub fn with_auto_advance(mut self, delay: Duration) -> Self {
        if let AdvancePolicy::AutoAfter(_) = self.advance {
            self.advance = AdvancePolicy::AutoAfter(delay);
        }
        self
    }
}
