use thiserror::Error;

use crate::model::{LessonError, ParseModeError, QuestionError, RulesError, SummaryError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
