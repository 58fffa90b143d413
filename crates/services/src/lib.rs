#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lesson_catalog;
pub mod quiz;
pub mod stats_store;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, CatalogError, QuizError, StatsError};
pub use lesson_catalog::LessonCatalog;
pub use quiz::{
    AdvanceOutcome, AnswerOutcome, DriverExit, DriverInput, QuestionView, QuizDriver, QuizService,
    QuizUpdate, RunReport,
};
pub use stats_store::{CompletionCredit, StatsStore};
