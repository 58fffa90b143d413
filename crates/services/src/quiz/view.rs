use quiz_core::model::{CompletionSummary, Mode, StatsOverview};
use quiz_core::quiz::QuizSession;

/// Presentation-agnostic snapshot of the question on screen.
///
/// Carries no formatting; renderers decide how to lay it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub lesson_title: String,
    pub mode: Mode,
    /// Zero-based position in the (possibly shuffled) run.
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub lives_remaining: Option<u32>,
}

impl QuestionView {
    /// View of the session's current question, `None` once the run is over.
    #[must_use]
    pub fn current(session: &QuizSession) -> Option<Self> {
        let index = session.current_index()?;
        let question = session.current_question()?;
        Some(Self {
            lesson_title: session.lesson().title().to_owned(),
            mode: session.mode(),
            index,
            total: session.lesson().len(),
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
            lives_remaining: session.lives_remaining(),
        })
    }
}

/// Everything a finished run produced, after persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub summary: CompletionSummary,
    /// One-time completion bonus; 0 on replays and game overs.
    pub lesson_bonus_xp: u64,
    pub history_id: i64,
    pub stats: StatsOverview,
}

impl RunReport {
    /// XP this run added: per-answer XP plus both bonuses.
    #[must_use]
    pub fn total_xp(&self) -> u64 {
        let bonus = if self.summary.is_completed() {
            self.summary.bonus_xp()
        } else {
            0
        };
        self.summary
            .xp_earned()
            .saturating_add(bonus)
            .saturating_add(self.lesson_bonus_xp)
    }
}
