use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::mode::Mode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("correct count ({correct}) exceeds total ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("unknown run outcome: {0}")]
    UnknownOutcome(String),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    Completed,
    /// Lives ran out before the last question.
    GameOver,
}

impl RunOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::GameOver => "game_over",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunOutcome {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(RunOutcome::Completed),
            "game_over" => Ok(RunOutcome::GameOver),
            _ => Err(SummaryError::UnknownOutcome(s.to_owned())),
        }
    }
}

/// Result of a finished quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    lesson_id: LessonId,
    mode: Mode,
    outcome: RunOutcome,
    correct_count: u32,
    total: u32,
    xp_earned: u64,
    bonus_xp: u64,
    lives_remaining: Option<u32>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl CompletionSummary {
    /// Rehydrate or assemble a summary.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if the time range is inverted or the correct
    /// count exceeds the total.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        lesson_id: LessonId,
        mode: Mode,
        outcome: RunOutcome,
        correct_count: u32,
        total: u32,
        xp_earned: u64,
        bonus_xp: u64,
        lives_remaining: Option<u32>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, SummaryError> {
        if finished_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        if correct_count > total {
            return Err(SummaryError::CountMismatch {
                correct: correct_count,
                total,
            });
        }
        Ok(Self {
            lesson_id,
            mode,
            outcome,
            correct_count,
            total,
            xp_earned,
            bonus_xp,
            lives_remaining,
            started_at,
            finished_at,
        })
    }

    /// Summary for a run that just ended. `finished_at` is clamped to
    /// `started_at` and `correct_count` to `total`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn finished(
        lesson_id: LessonId,
        mode: Mode,
        outcome: RunOutcome,
        correct_count: u32,
        total: u32,
        xp_earned: u64,
        bonus_xp: u64,
        lives_remaining: Option<u32>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lesson_id,
            mode,
            outcome,
            correct_count: correct_count.min(total),
            total,
            xp_earned,
            bonus_xp,
            lives_remaining,
            started_at,
            finished_at: finished_at.max(started_at),
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// XP from correct answers in this run (excludes the bonus).
    #[must_use]
    pub fn xp_earned(&self) -> u64 {
        self.xp_earned
    }

    #[must_use]
    pub fn bonus_xp(&self) -> u64 {
        self.bonus_xp
    }

    #[must_use]
    pub fn lives_remaining(&self) -> Option<u32> {
        self.lives_remaining
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = CompletionSummary::from_persisted(
            LessonId::new("L1"),
            Mode::Fun,
            RunOutcome::Completed,
            1,
            2,
            5,
            0,
            None,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SummaryError::InvalidTimeRange);
    }

    #[test]
    fn rejects_more_correct_than_total() {
        let now = fixed_now();
        let err = CompletionSummary::from_persisted(
            LessonId::new("L1"),
            Mode::Fun,
            RunOutcome::Completed,
            3,
            2,
            15,
            0,
            None,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(err, SummaryError::CountMismatch { correct: 3, total: 2 });
    }

    #[test]
    fn outcome_strings_round_trip() {
        for outcome in [RunOutcome::Completed, RunOutcome::GameOver] {
            assert_eq!(outcome.as_str().parse::<RunOutcome>().unwrap(), outcome);
        }
        assert!("won".parse::<RunOutcome>().is_err());
    }
}
