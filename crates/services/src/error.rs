//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{LessonError, LessonId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `StatsStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error("failed to encode completed lessons: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading lessons.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog contains no lessons")]
    Empty,
    #[error("duplicate lesson id: {0}")]
    DuplicateId(LessonId),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid lesson file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Lesson(#[from] LessonError),
}

/// Errors emitted by quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("unknown lesson: {0}")]
    UnknownLesson(LessonId),
    #[error("finished session has no summary")]
    MissingSummary,
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
