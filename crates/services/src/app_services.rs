use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{GameRules, Lesson, LessonId, Mode};
use storage::repository::{CompletionLogRepository, CompletionRow, Storage};

use crate::Clock;
use crate::error::{AppServicesError, QuizError};
use crate::lesson_catalog::LessonCatalog;
use crate::quiz::{QuizDriver, QuizService};
use crate::stats_store::StatsStore;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<LessonCatalog>,
    stats: Arc<StatsStore>,
    completions: Arc<dyn CompletionLogRepository>,
    quiz: QuizService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        rules: GameRules,
        catalog: LessonCatalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, rules, catalog))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, rules: GameRules, catalog: LessonCatalog) -> Self {
        Self::from_storage(Storage::in_memory(), clock, rules, catalog)
    }

    #[must_use]
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        rules: GameRules,
        catalog: LessonCatalog,
    ) -> Self {
        let stats = Arc::new(StatsStore::new(Arc::clone(&storage.values), rules));
        let quiz = QuizService::new(clock, Arc::clone(&stats), Arc::clone(&storage.completions));
        Self {
            catalog: Arc::new(catalog),
            stats,
            completions: storage.completions,
            quiz,
        }
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.quiz = self.quiz.with_shuffle_questions(shuffle);
        self
    }

    #[must_use]
    pub fn with_auto_advance(mut self, delay: Duration) -> Self {
        self.quiz = self.quiz.with_auto_advance(delay);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LessonCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsStore> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn quiz(&self) -> QuizService {
        self.quiz.clone()
    }

    /// # Errors
    ///
    /// Returns `QuizError::UnknownLesson` if the catalog has no such lesson.
    pub fn lesson(&self, id: &LessonId) -> Result<&Lesson, QuizError> {
        self.catalog
            .get(id)
            .ok_or_else(|| QuizError::UnknownLesson(id.clone()))
    }

    /// Start a driven run of a catalog lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownLesson` if the catalog has no such lesson.
    pub fn start(&self, id: &LessonId, mode: Mode) -> Result<QuizDriver, QuizError> {
        let session = self.quiz.start(self.lesson(id)?, mode);
        Ok(QuizDriver::new(self.quiz.clone(), session))
    }

    /// Most recent finished runs, optionally for one lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if history cannot be read.
    pub async fn history(
        &self,
        lesson_id: Option<&LessonId>,
        limit: u32,
    ) -> Result<Vec<CompletionRow>, QuizError> {
        Ok(self.completions.list_recent(lesson_id, limit).await?)
    }
}
