use tokio::sync::mpsc;
use tracing::{debug, info};

use quiz_core::quiz::{AnswerFeedback, NextStep, QuizSession, Selection, SelectionRejected};

use super::timer::{AdvanceTimer, TimerFired};
use super::view::{QuestionView, RunReport};
use super::workflow::{AdvanceOutcome, AnswerOutcome, QuizService};
use crate::error::QuizError;

/// Player input fed to a running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverInput {
    Select(Selection),
    /// Advance past the answered question, skipping any auto-advance wait.
    Confirm,
    Quit,
}

/// What the renderer should show next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizUpdate {
    Question(QuestionView),
    Feedback(AnswerFeedback),
    Ignored(SelectionRejected),
    Finished(RunReport),
}

/// How a driven quiz ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverExit {
    Finished(RunReport),
    /// The player quit or the input side closed before the run ended.
    Abandoned,
}

/// Runs one quiz session on a single task.
///
/// Player input and timer fires arrive on queues and are handled one at a
/// time, so the session never sees concurrent transitions.
pub struct QuizDriver {
    service: QuizService,
    session: QuizSession,
    timer: AdvanceTimer,
}

impl QuizDriver {
    #[must_use]
    pub fn new(service: QuizService, session: QuizSession) -> Self {
        Self {
            service,
            session,
            timer: AdvanceTimer::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Drive the session until it finishes or the player quits.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if persisting an answer or the final result fails.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<DriverInput>,
        updates: mpsc::Sender<QuizUpdate>,
    ) -> Result<DriverExit, QuizError> {
        let (fired_tx, mut fired_rx) = mpsc::channel(1);

        if let Some(view) = QuestionView::current(&self.session) {
            emit(&updates, QuizUpdate::Question(view)).await;
        }

        loop {
            tokio::select! {
                input = inputs.recv() => {
                    let exit = match input {
                        Some(DriverInput::Select(selection)) => {
                            self.select(selection, &fired_tx, &updates).await?
                        }
                        Some(DriverInput::Confirm) => self.advance(&updates).await?,
                        Some(DriverInput::Quit) | None => {
                            self.timer.cancel();
                            info!(lesson = %self.session.lesson().id(), "quiz abandoned");
                            Some(DriverExit::Abandoned)
                        }
                    };
                    if let Some(exit) = exit {
                        return Ok(exit);
                    }
                }
                Some(fired) = fired_rx.recv() => {
                    if !self.timer.accept(fired) {
                        debug!("stale timer fire dropped");
                        continue;
                    }
                    if let Some(exit) = self.advance(&updates).await? {
                        return Ok(exit);
                    }
                }
            }
        }
    }

    async fn select(
        &mut self,
        selection: Selection,
        fired: &mpsc::Sender<TimerFired>,
        updates: &mpsc::Sender<QuizUpdate>,
    ) -> Result<Option<DriverExit>, QuizError> {
        match self.service.answer(&mut self.session, selection).await? {
            AnswerOutcome::Accepted(feedback) => {
                if let NextStep::AutoAdvance(delay) = feedback.next {
                    self.timer.schedule(delay, fired.clone());
                }
                emit(updates, QuizUpdate::Feedback(feedback)).await;
                Ok(None)
            }
            AnswerOutcome::Ignored(rejected) => {
                emit(updates, QuizUpdate::Ignored(rejected)).await;
                Ok(None)
            }
            AnswerOutcome::GameOver { feedback, report } => {
                self.timer.cancel();
                emit(updates, QuizUpdate::Feedback(feedback)).await;
                emit(updates, QuizUpdate::Finished(report.clone())).await;
                Ok(Some(DriverExit::Finished(report)))
            }
        }
    }

    async fn advance(
        &mut self,
        updates: &mpsc::Sender<QuizUpdate>,
    ) -> Result<Option<DriverExit>, QuizError> {
        self.timer.cancel();
        match self.service.advance(&mut self.session).await? {
            AdvanceOutcome::Next(view) => {
                emit(updates, QuizUpdate::Question(view)).await;
                Ok(None)
            }
            AdvanceOutcome::Completed(report) => {
                emit(updates, QuizUpdate::Finished(report.clone())).await;
                Ok(Some(DriverExit::Finished(report)))
            }
            AdvanceOutcome::Ignored(rejected) => {
                debug!(%rejected, "confirm ignored");
                Ok(None)
            }
        }
    }
}

async fn emit(updates: &mpsc::Sender<QuizUpdate>, update: QuizUpdate) {
    if updates.send(update).await.is_err() {
        debug!("update receiver closed");
    }
}
