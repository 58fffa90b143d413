use std::sync::Arc;
use std::time::Duration;

use rand::rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{CompletionSummary, Lesson, Mode};
use quiz_core::quiz::{
    Advance, AdvanceRejected, AnswerFeedback, NextStep, QuizSession, Selection, SelectionRejected,
};
use storage::repository::CompletionLogRepository;

use super::view::{QuestionView, RunReport};
use crate::error::QuizError;
use crate::stats_store::StatsStore;

/// Result of submitting a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Scored and persisted; the session now waits to advance.
    Accepted(AnswerFeedback),
    /// Duplicate, stale, or invalid selection. Nothing changed.
    Ignored(SelectionRejected),
    /// The answer cost the last life. The run is over and recorded.
    GameOver {
        feedback: AnswerFeedback,
        report: RunReport,
    },
}

/// Result of moving past an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next(QuestionView),
    Completed(RunReport),
    Ignored(AdvanceRejected),
}

/// Orchestrates quiz sessions and persists their effects.
///
/// The session itself stays pure; this service applies each accepted
/// transition to the stats store and the completion history.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    stats: Arc<StatsStore>,
    completions: Arc<dyn CompletionLogRepository>,
    shuffle_questions: bool,
    auto_advance: Option<Duration>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        stats: Arc<StatsStore>,
        completions: Arc<dyn CompletionLogRepository>,
    ) -> Self {
        Self {
            clock,
            stats,
            completions,
            shuffle_questions: false,
            auto_advance: None,
        }
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    /// Override the auto-advance delay of modes that advance on their own.
    #[must_use]
    pub fn with_auto_advance(mut self, delay: Duration) -> Self {
        self.auto_advance = Some(delay);
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsStore> {
        Arc::clone(&self.stats)
    }

    /// Start a run of `lesson` in `mode`, optionally with shuffled questions.
    #[must_use]
    pub fn start(&self, lesson: &Lesson, mode: Mode) -> QuizSession {
        let lesson = if self.shuffle_questions {
            lesson.reordered(|questions| questions.shuffle(&mut rng()))
        } else {
            lesson.clone()
        };

        let mut policy = mode.policy();
        if let Some(delay) = self.auto_advance {
            policy = policy.with_auto_advance(delay);
        }

        info!(
            lesson = %lesson.id(),
            mode = %mode,
            questions = lesson.len(),
            shuffled = self.shuffle_questions,
            "quiz started"
        );
        QuizSession::with_policy(lesson, mode, policy, *self.stats.rules(), self.clock.now())
    }

    /// Score a selection and record it in the player's stats.
    ///
    /// Rejected selections come back as `AnswerOutcome::Ignored` without
    /// touching storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if stats or history cannot be persisted.
    pub async fn answer(
        &self,
        session: &mut QuizSession,
        selection: Selection,
    ) -> Result<AnswerOutcome, QuizError> {
        let feedback = match session.select(selection, self.clock.now()) {
            Ok(feedback) => feedback,
            Err(rejected) => {
                debug!(%rejected, "selection ignored");
                return Ok(AnswerOutcome::Ignored(rejected));
            }
        };

        self.stats.record_answer(feedback.is_correct).await?;

        if feedback.next != NextStep::GameOver {
            return Ok(AnswerOutcome::Accepted(feedback));
        }

        let summary = session
            .summary()
            .cloned()
            .ok_or(QuizError::MissingSummary)?;
        let report = self.finish(summary).await?;
        Ok(AnswerOutcome::GameOver { feedback, report })
    }

    /// Move to the next question, or finish and credit the run.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if stats or history cannot be persisted.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<AdvanceOutcome, QuizError> {
        match session.advance(self.clock.now()) {
            Ok(Advance::Next { .. }) => Ok(QuestionView::current(session).map_or(
                AdvanceOutcome::Ignored(AdvanceRejected::Finished),
                AdvanceOutcome::Next,
            )),
            Ok(Advance::Completed(summary)) => {
                let report = self.finish(summary).await?;
                Ok(AdvanceOutcome::Completed(report))
            }
            Err(rejected) => {
                debug!(%rejected, "advance ignored");
                Ok(AdvanceOutcome::Ignored(rejected))
            }
        }
    }

    /// History is written before stats are credited, so a failed insert leaves the
    /// streak, lesson credit and bonus untouched.
    async fn finish(&self, summary: CompletionSummary) -> Result<RunReport, QuizError> {
        let history_id = self.completions.append_completion(&summary).await?;
        let credit = self.stats.credit_completion(&summary).await?;

        info!(
            lesson = %summary.lesson_id(),
            mode = %summary.mode(),
            outcome = %summary.outcome(),
            correct = summary.correct_count(),
            total = summary.total(),
            bonus_xp = credit.bonus_xp,
            lesson_bonus_xp = credit.lesson_bonus_xp,
            history_id,
            "quiz finished"
        );

        Ok(RunReport {
            summary,
            lesson_bonus_xp: credit.lesson_bonus_xp,
            history_id,
            stats: credit.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{GameRules, LessonDraft, QuestionDraft};
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn lesson(n: usize) -> Lesson {
        let questions = (0..n)
            .map(|i| QuestionDraft::new(format!("Q{i}"), ["right", "wrong"], 0))
            .collect();
        LessonDraft::new("L1", questions).validate().unwrap()
    }

    fn service(shuffle: bool) -> QuizService {
        let repo = InMemoryRepository::new();
        let stats = Arc::new(StatsStore::new(Arc::new(repo.clone()), GameRules::default()));
        QuizService::new(fixed_clock(), stats, Arc::new(repo)).with_shuffle_questions(shuffle)
    }

    #[test]
    fn shuffled_start_keeps_every_question() {
        let lesson = lesson(8);
        let session = service(true).start(&lesson, Mode::Fun);

        let mut prompts: Vec<_> = session
            .lesson()
            .questions()
            .iter()
            .map(|q| q.prompt().to_owned())
            .collect();
        prompts.sort();
        let mut expected: Vec<_> = lesson
            .questions()
            .iter()
            .map(|q| q.prompt().to_owned())
            .collect();
        expected.sort();
        assert_eq!(prompts, expected);
    }

    #[test]
    fn auto_advance_override_applies_to_auto_modes_only() {
        let svc = service(false).with_auto_advance(Duration::from_millis(250));
        let fun = svc.start(&lesson(1), Mode::Fun);
        let learn = svc.start(&lesson(1), Mode::Learn);

        assert_eq!(
            fun.policy().advance,
            quiz_core::model::AdvancePolicy::AutoAfter(Duration::from_millis(250))
        );
        assert_eq!(learn.policy().advance, quiz_core::model::AdvancePolicy::Manual);
    }

    #[tokio::test]
    async fn ignored_selection_does_not_touch_stats() {
        let svc = service(false);
        let mut session = svc.start(&lesson(2), Mode::Learn);

        let outcome = svc.answer(&mut session, Selection::new(1, 0)).await.unwrap();
        assert!(matches!(outcome, AnswerOutcome::Ignored(SelectionRejected::Stale { .. })));
        assert_eq!(svc.stats().load().await.unwrap().questions_answered(), 0);

        let outcome = svc.advance(&mut session).await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Ignored(AdvanceRejected::NotAnswered(0)));
    }
}
