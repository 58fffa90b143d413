//! Quiz session state machine.
//!
//! A session walks a lesson's questions in order:
//!
//! ```text
//! Showing(i) --select--> Answered(i) --advance--> Showing(i + 1)
//!                              |                  \-> Completed (after the last question)
//!                              \--last life lost--> GameOver
//! ```
//!
//! Transitions are pure: they return a description of what changed and leave
//! persistence and rendering to the caller.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    AdvancePolicy, BonusMetric, BonusPolicy, CompletionSummary, GameRules, Lesson, Mode,
    ModePolicy, Question, RunOutcome,
};

//
// ─── EVENTS & REJECTIONS ───────────────────────────────────────────────────────
//

/// A player's pick of `option` for the question at `question_index`.
///
/// Carrying the question index lets the session recognise events that were
/// produced for a question that is no longer showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub question_index: usize,
    pub option: usize,
}

impl Selection {
    #[must_use]
    pub fn new(question_index: usize, option: usize) -> Self {
        Self {
            question_index,
            option,
        }
    }
}

/// Why a selection was ignored. None of these mutate the session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionRejected {
    #[error("question {0} was already answered")]
    AlreadyAnswered(usize),

    #[error("selection for question {got} while question {current} is showing")]
    Stale { current: usize, got: usize },

    #[error("option {option} is out of range for {len} options")]
    OptionOutOfRange { option: usize, len: usize },

    #[error("session is finished")]
    Finished,
}

/// Why an advance request was ignored.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdvanceRejected {
    #[error("question {0} has not been answered yet")]
    NotAnswered(usize),

    #[error("session is finished")]
    Finished,
}

//
// ─── TRANSITION OUTPUTS ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Showing(usize),
    Answered(usize),
    Completed,
    GameOver,
}

impl QuizPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, QuizPhase::Completed | QuizPhase::GameOver)
    }
}

/// Visual reaction hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Celebrate,
    Shake,
}

/// What should happen after feedback has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Advance once the delay elapses.
    AutoAdvance(Duration),
    /// Wait for the player to confirm.
    AwaitConfirm,
    /// The run ended; no further questions.
    GameOver,
}

/// Description of an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_index: usize,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub lives_remaining: Option<u32>,
    pub cue: Option<FeedbackCue>,
    pub next: NextStep,
}

/// Result of moving past an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next { question_index: usize },
    Completed(CompletionSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub correct: usize,
    pub is_finished: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a lesson.
pub struct QuizSession {
    lesson: Lesson,
    mode: Mode,
    policy: ModePolicy,
    rules: GameRules,
    phase: QuizPhase,
    answered: usize,
    correct: usize,
    lives: Option<u32>,
    started_at: DateTime<Utc>,
    summary: Option<CompletionSummary>,
}

impl QuizSession {
    /// Start a session with the mode's default policy.
    #[must_use]
    pub fn new(lesson: Lesson, mode: Mode, rules: GameRules, started_at: DateTime<Utc>) -> Self {
        Self::with_policy(lesson, mode, mode.policy(), rules, started_at)
    }

    #[must_use]
    pub fn with_policy(
        lesson: Lesson,
        mode: Mode,
        policy: ModePolicy,
        rules: GameRules,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lesson,
            mode,
            policy,
            rules,
            phase: QuizPhase::Showing(0),
            answered: 0,
            correct: 0,
            lives: policy.starting_lives,
            started_at,
            summary: None,
        }
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn policy(&self) -> &ModePolicy {
        &self.policy
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn lives_remaining(&self) -> Option<u32> {
        self.lives
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Summary of a finished run, `None` while still playing.
    #[must_use]
    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    /// Index of the question on screen, answered or not.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Showing(i) | QuizPhase::Answered(i) => Some(i),
            QuizPhase::Completed | QuizPhase::GameOver => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.lesson.question(i))
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.lesson.len();
        QuizProgress {
            total,
            answered: self.answered,
            remaining: total.saturating_sub(self.answered),
            correct: self.correct,
            is_finished: self.is_finished(),
        }
    }

    /// Score a selection for the showing question.
    ///
    /// `at` timestamps the end of the run when this answer costs the last life.
    ///
    /// # Errors
    ///
    /// Returns `SelectionRejected` for duplicate, stale, out-of-range, or
    /// post-finish selections. A rejected selection changes nothing.
    pub fn select(
        &mut self,
        selection: Selection,
        at: DateTime<Utc>,
    ) -> Result<AnswerFeedback, SelectionRejected> {
        let index = match self.phase {
            QuizPhase::Showing(i) => i,
            QuizPhase::Answered(i) if selection.question_index == i => {
                return Err(SelectionRejected::AlreadyAnswered(i));
            }
            QuizPhase::Answered(i) => {
                return Err(SelectionRejected::Stale {
                    current: i,
                    got: selection.question_index,
                });
            }
            QuizPhase::Completed | QuizPhase::GameOver => {
                return Err(SelectionRejected::Finished);
            }
        };

        if selection.question_index != index {
            return Err(SelectionRejected::Stale {
                current: index,
                got: selection.question_index,
            });
        }

        let question = self
            .lesson
            .question(index)
            .ok_or(SelectionRejected::Finished)?;
        if selection.option >= question.option_count() {
            return Err(SelectionRejected::OptionOutOfRange {
                option: selection.option,
                len: question.option_count(),
            });
        }

        let is_correct = question.is_correct(selection.option);
        let correct_index = question.correct_index();
        let explanation = question.explanation().map(str::to_owned);

        self.answered += 1;
        if is_correct {
            self.correct += 1;
        } else if let Some(lives) = self.lives.as_mut() {
            *lives = lives.saturating_sub(1);
        }

        let cue = self.policy.feedback_cues.then_some(if is_correct {
            FeedbackCue::Celebrate
        } else {
            FeedbackCue::Shake
        });

        let next = if self.lives == Some(0) {
            self.phase = QuizPhase::GameOver;
            self.summary = Some(self.build_summary(RunOutcome::GameOver, at));
            NextStep::GameOver
        } else {
            self.phase = QuizPhase::Answered(index);
            match self.policy.advance {
                AdvancePolicy::AutoAfter(delay) => NextStep::AutoAdvance(delay),
                AdvancePolicy::Manual => NextStep::AwaitConfirm,
            }
        };

        Ok(AnswerFeedback {
            question_index: index,
            selected: selection.option,
            correct_index,
            is_correct,
            explanation,
            lives_remaining: self.lives,
            cue,
            next,
        })
    }

    /// Move past the answered question.
    ///
    /// `Advance::Completed` is produced at most once per session, so a bonus
    /// credited from it is credited once.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceRejected` if the current question is unanswered or the
    /// session already finished.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<Advance, AdvanceRejected> {
        let index = match self.phase {
            QuizPhase::Answered(i) => i,
            QuizPhase::Showing(i) => return Err(AdvanceRejected::NotAnswered(i)),
            QuizPhase::Completed | QuizPhase::GameOver => return Err(AdvanceRejected::Finished),
        };

        let next = index + 1;
        if next < self.lesson.len() {
            self.phase = QuizPhase::Showing(next);
            return Ok(Advance::Next {
                question_index: next,
            });
        }

        self.phase = QuizPhase::Completed;
        let summary = self.build_summary(RunOutcome::Completed, at);
        self.summary = Some(summary.clone());
        Ok(Advance::Completed(summary))
    }

    fn build_summary(&self, outcome: RunOutcome, at: DateTime<Utc>) -> CompletionSummary {
        let correct = u32::try_from(self.correct).unwrap_or(u32::MAX);
        let total = u32::try_from(self.lesson.len()).unwrap_or(u32::MAX);
        let xp_earned = u64::from(correct).saturating_mul(self.rules.xp_per_correct());

        let bonus_xp = match outcome {
            RunOutcome::Completed => {
                let metric = match self.policy.bonus {
                    BonusPolicy::None => None,
                    BonusPolicy::Speed { .. } => Some(BonusMetric::Elapsed(
                        (at - self.started_at).max(chrono::Duration::zero()),
                    )),
                    BonusPolicy::Survival { .. } => {
                        Some(BonusMetric::LivesRemaining(self.lives.unwrap_or(0)))
                    }
                };
                self.policy.bonus.bonus(self.lesson.len(), metric)
            }
            RunOutcome::GameOver => 0,
        };

        CompletionSummary::finished(
            self.lesson.id().clone(),
            self.mode,
            outcome,
            correct,
            total,
            xp_earned,
            bonus_xp,
            self.lives,
            self.started_at,
            at,
        )
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("lesson_id", self.lesson.id())
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("answered", &self.answered)
            .field("correct", &self.correct)
            .field("lives", &self.lives)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
