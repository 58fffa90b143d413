use std::collections::HashSet;
use std::path::Path;

use quiz_core::model::{Lesson, LessonDraft, LessonId};
use serde::Deserialize;

use crate::error::CatalogError;

/// Lesson files are either a bare array or `{ "lessons": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<LessonDraft>),
    Wrapped { lessons: Vec<LessonDraft> },
}

impl CatalogFile {
    fn into_drafts(self) -> Vec<LessonDraft> {
        match self {
            CatalogFile::List(lessons) | CatalogFile::Wrapped { lessons } => lessons,
        }
    }
}

/// Ordered collection of validated lessons with unique ids.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    lessons: Vec<Lesson>,
}

impl LessonCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list or
    /// `CatalogError::DuplicateId` if two lessons share an id.
    pub fn from_lessons(lessons: Vec<Lesson>) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for lesson in &lessons {
            if !seen.insert(lesson.id()) {
                return Err(CatalogError::DuplicateId(lesson.id().clone()));
            }
        }
        Ok(Self { lessons })
    }

    /// Parse and validate a JSON lesson file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or a lesson is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let lessons = file
            .into_drafts()
            .into_iter()
            .map(LessonDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_lessons(lessons)
    }

    /// Read and validate a JSON lesson file from disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any error
    /// from [`LessonCatalog::from_json_str`].
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}
