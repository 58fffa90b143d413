use std::fmt;

use crate::model::ids::LessonId;
use crate::model::rules::GameRules;

//
// ─── DERIVED READS ─────────────────────────────────────────────────────────────
//

/// Level for a given XP total. Levels start at 1.
///
/// A zero bucket size is treated as a single bucket so the result stays defined.
#[must_use]
pub fn level_for_xp(xp: u64, xp_per_level: u64) -> u64 {
    xp.checked_div(xp_per_level).unwrap_or(0).saturating_add(1)
}

/// XP accumulated inside the current level, always `< xp_per_level`.
#[must_use]
pub fn xp_in_level(xp: u64, xp_per_level: u64) -> u64 {
    xp.checked_rem(xp_per_level).unwrap_or(0)
}

/// Percentage of correct answers, rounded half up. Zero answered yields 0.
#[must_use]
pub fn accuracy_percent(correct: u64, answered: u64) -> u8 {
    if answered == 0 {
        return 0;
    }
    let correct = u128::from(correct.min(answered));
    let answered = u128::from(answered);
    let rounded = (200 * correct + answered) / (2 * answered);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── PLAYER TITLE ──────────────────────────────────────────────────────────────
//

/// Rank shown next to the player's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlayerTitle {
    Apprentice,
    Learner,
    Scholar,
    Expert,
    Master,
}

impl PlayerTitle {
    /// Highest tier whose threshold the level reaches.
    #[must_use]
    pub fn for_level(level: u64) -> Self {
        match level {
            10.. => Self::Master,
            7.. => Self::Expert,
            4.. => Self::Scholar,
            2.. => Self::Learner,
            _ => Self::Apprentice,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apprentice => "Apprentice",
            Self::Learner => "Learner",
            Self::Scholar => "Scholar",
            Self::Expert => "Expert",
            Self::Master => "Master",
        }
    }
}

impl fmt::Display for PlayerTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PLAYER STATS ──────────────────────────────────────────────────────────────
//

/// Lifetime progress of the player.
///
/// Counters only move through the operations below; the streak is the only
/// value that ever goes back to zero, and only on a wrong answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    xp: u64,
    questions_answered: u64,
    correct_answers: u64,
    streak: u64,
    completed_lessons: Vec<LessonId>,
}

impl PlayerStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate stats from persisted counters.
    ///
    /// `correct_answers` is clamped to `questions_answered` and duplicate lesson
    /// ids are dropped, keeping first occurrence order.
    #[must_use]
    pub fn from_persisted(
        xp: u64,
        questions_answered: u64,
        correct_answers: u64,
        streak: u64,
        completed_lessons: Vec<LessonId>,
    ) -> Self {
        let mut deduped: Vec<LessonId> = Vec::with_capacity(completed_lessons.len());
        for id in completed_lessons {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Self {
            xp,
            questions_answered,
            correct_answers: correct_answers.min(questions_answered),
            streak,
            completed_lessons: deduped,
        }
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    #[must_use]
    pub fn questions_answered(&self) -> u64 {
        self.questions_answered
    }

    #[must_use]
    pub fn correct_answers(&self) -> u64 {
        self.correct_answers
    }

    #[must_use]
    pub fn streak(&self) -> u64 {
        self.streak
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &[LessonId] {
        &self.completed_lessons
    }

    #[must_use]
    pub fn has_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    /// Count an answer. Returns the XP awarded for it.
    pub fn record_answer(&mut self, is_correct: bool, rules: &GameRules) -> u64 {
        self.questions_answered = self.questions_answered.saturating_add(1);
        if is_correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
            self.xp = self.xp.saturating_add(rules.xp_per_correct());
            rules.xp_per_correct()
        } else {
            self.streak = 0;
            0
        }
    }

    /// Mark a lesson as completed. Only the first completion of an id awards XP.
    ///
    /// Returns true if the completion bonus was awarded.
    pub fn complete_lesson(&mut self, lesson_id: &LessonId, rules: &GameRules) -> bool {
        if self.has_completed(lesson_id) {
            return false;
        }
        self.completed_lessons.push(lesson_id.clone());
        self.xp = self.xp.saturating_add(rules.lesson_completion_xp());
        true
    }

    pub fn increment_streak(&mut self) {
        self.streak = self.streak.saturating_add(1);
    }

    pub fn award_bonus(&mut self, bonus_xp: u64) {
        self.xp = self.xp.saturating_add(bonus_xp);
    }

    #[must_use]
    pub fn level(&self, rules: &GameRules) -> u64 {
        level_for_xp(self.xp, rules.xp_per_level())
    }

    #[must_use]
    pub fn xp_in_level(&self, rules: &GameRules) -> u64 {
        xp_in_level(self.xp, rules.xp_per_level())
    }

    #[must_use]
    pub fn accuracy(&self) -> u8 {
        accuracy_percent(self.correct_answers, self.questions_answered)
    }

    #[must_use]
    pub fn title(&self, rules: &GameRules) -> PlayerTitle {
        PlayerTitle::for_level(self.level(rules))
    }

    /// Snapshot of everything a stats panel renders.
    #[must_use]
    pub fn overview(&self, rules: &GameRules) -> StatsOverview {
        let xp_in_level = self.xp_in_level(rules);
        let xp_per_level = rules.xp_per_level();
        let level = self.level(rules);
        StatsOverview {
            xp: self.xp,
            level,
            xp_in_level,
            xp_per_level,
            xp_to_next_level: xp_per_level.saturating_sub(xp_in_level),
            level_progress_percent: level_progress_percent(xp_in_level, xp_per_level),
            questions_answered: self.questions_answered,
            correct_answers: self.correct_answers,
            accuracy: self.accuracy(),
            streak: self.streak,
            title: PlayerTitle::for_level(level),
            lessons_completed: self.completed_lessons.len(),
        }
    }
}

fn level_progress_percent(xp_in_level: u64, xp_per_level: u64) -> u8 {
    if xp_per_level == 0 {
        return 0;
    }
    let pct = u128::from(xp_in_level) * 100 / u128::from(xp_per_level);
    u8::try_from(pct).unwrap_or(100)
}

/// Derived, render-ready view of `PlayerStats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsOverview {
    pub xp: u64,
    pub level: u64,
    pub xp_in_level: u64,
    pub xp_per_level: u64,
    pub xp_to_next_level: u64,
    pub level_progress_percent: u8,
    pub questions_answered: u64,
    pub correct_answers: u64,
    pub accuracy: u8,
    pub streak: u64,
    pub title: PlayerTitle,
    pub lessons_completed: usize,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
