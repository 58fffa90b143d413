mod ids;
mod lesson;
mod mode;
mod question;
mod rules;
mod stats;
mod summary;

pub use ids::LessonId;
pub use lesson::{Lesson, LessonDraft, LessonError};
pub use mode::{
    AdvancePolicy, BonusMetric, BonusPolicy, CHALLENGE_STARTING_LIVES, DEFAULT_AUTO_ADVANCE, Mode,
    ModePolicy, ParseModeError, SPEEDRUN_SECONDS_PER_QUESTION, SURVIVAL_XP_PER_LIFE, speed_bonus,
    survival_bonus,
};
pub use question::{MIN_OPTIONS, Question, QuestionDraft, QuestionError};
pub use rules::{GameRules, LESSON_COMPLETION_XP, RulesError, XP_PER_CORRECT, XP_PER_LEVEL};
pub use stats::{
    PlayerStats, PlayerTitle, StatsOverview, accuracy_percent, level_for_xp, xp_in_level,
};
pub use summary::{CompletionSummary, RunOutcome, SummaryError};
