use async_trait::async_trait;
use quiz_core::model::{CompletionSummary, LessonId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── STAT KEYS ─────────────────────────────────────────────────────────────────
//

/// Keys under which player counters are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Xp,
    QuestionsAnswered,
    CorrectAnswers,
    Streak,
    /// JSON array of lesson ids.
    CompletedLessons,
}

impl StatKey {
    pub const ALL: [StatKey; 5] = [
        StatKey::Xp,
        StatKey::QuestionsAnswered,
        StatKey::CorrectAnswers,
        StatKey::Streak,
        StatKey::CompletedLessons,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Xp => "xp",
            StatKey::QuestionsAnswered => "questionsAnswered",
            StatKey::CorrectAnswers => "correctAnswers",
            StatKey::Streak => "streak",
            StatKey::CompletedLessons => "completedLessons",
        }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// String key-value persistence for player counters.
///
/// Values are stored as written; interpreting them (and tolerating garbage) is
/// the caller's job.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write several entries atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entries cannot be stored.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Delete the given keys. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Fetch several values in key order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.get(key).await?);
        }
        Ok(out)
    }

    /// Write a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }
}

/// A persisted run summary with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRow {
    pub id: i64,
    pub summary: CompletionSummary,
}

impl CompletionRow {
    #[must_use]
    pub fn new(id: i64, summary: CompletionSummary) -> Self {
        Self { id, summary }
    }
}

/// Append-only history of finished runs.
#[async_trait]
pub trait CompletionLogRepository: Send + Sync {
    /// Store a summary and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_completion(&self, summary: &CompletionSummary) -> Result<i64, StorageError>;

    /// Fetch a summary by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_completion(&self, id: i64) -> Result<CompletionSummary, StorageError>;

    /// Most recent runs first, optionally for a single lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_recent(
        &self,
        lesson_id: Option<&LessonId>,
        limit: u32,
    ) -> Result<Vec<CompletionRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
    completions: Arc<Mutex<Vec<CompletionSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

#[async_trait]
impl CompletionLogRepository for InMemoryRepository {
    async fn append_completion(&self, summary: &CompletionSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(summary.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn get_completion(&self, id: i64) -> Result<CompletionSummary, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| guard.get(idx).cloned())
            .ok_or(StorageError::NotFound)
    }

    async fn list_recent(
        &self,
        lesson_id: Option<&LessonId>,
        limit: u32,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let mut rows: Vec<CompletionRow> = guard
            .iter()
            .enumerate()
            .filter(|(_, s)| lesson_id.is_none_or(|id| s.lesson_id() == id))
            .map(|(idx, s)| {
                CompletionRow::new(i64::try_from(idx + 1).unwrap_or(i64::MAX), s.clone())
            })
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .finished_at()
                .cmp(&a.summary.finished_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Bundle of repositories handed to the services layer.
#[derive(Clone)]
pub struct Storage {
    pub values: Arc<dyn KeyValueStore>,
    pub completions: Arc<dyn CompletionLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let values: Arc<dyn KeyValueStore> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionLogRepository> = Arc::new(repo);
        Self {
            values,
            completions,
        }
    }
}
