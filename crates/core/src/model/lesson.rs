use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    BlankId,

    #[error("lesson {0} has no questions")]
    Empty(LessonId),

    #[error("lesson {lesson}, question {position}: {source}")]
    InvalidQuestion {
        lesson: LessonId,
        position: usize,
        #[source]
        source: QuestionError,
    },
}

/// Unvalidated lesson as it appears in lesson files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LessonDraft {
    pub id: LessonId,
    #[serde(default)]
    pub title: Option<String>,
    pub questions: Vec<QuestionDraft>,
}

impl LessonDraft {
    #[must_use]
    pub fn new(id: impl Into<LessonId>, questions: Vec<QuestionDraft>) -> Self {
        Self {
            id: id.into(),
            title: None,
            questions,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Validate the draft and all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the id is blank, there are no questions, or any
    /// question fails validation.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        if self.id.is_blank() {
            return Err(LessonError::BlankId);
        }
        if self.questions.is_empty() {
            return Err(LessonError::Empty(self.id));
        }

        let mut questions = Vec::with_capacity(self.questions.len());
        for (position, draft) in self.questions.into_iter().enumerate() {
            let question = draft
                .validate()
                .map_err(|source| LessonError::InvalidQuestion {
                    lesson: self.id.clone(),
                    position,
                    source,
                })?;
            questions.push(question);
        }

        let title = self
            .title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.id.to_string());

        Ok(Lesson {
            id: self.id,
            title,
            questions,
        })
    }
}

/// An ordered, non-empty set of questions completed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    questions: Vec<Question>,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a validated lesson.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns a copy of this lesson with questions reordered by `reorder`.
    ///
    /// The closure receives the question slice and must only permute it.
    #[must_use]
    pub fn reordered(&self, reorder: impl FnOnce(&mut [Question])) -> Self {
        let mut questions = self.questions.clone();
        reorder(&mut questions);
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_question(n: usize) -> QuestionDraft {
        QuestionDraft::new(format!("Q{n}"), ["a", "b", "c"], n % 3)
    }

    #[test]
    fn validates_questions_and_defaults_title_to_id() {
        let lesson = LessonDraft::new("L1", vec![draft_question(0), draft_question(1)])
            .validate()
            .unwrap();

        assert_eq!(lesson.id().as_str(), "L1");
        assert_eq!(lesson.title(), "L1");
        assert_eq!(lesson.len(), 2);
        assert_eq!(lesson.question(1).unwrap().correct_index(), 1);
        assert!(lesson.question(2).is_none());
    }

    #[test]
    fn empty_lesson_is_rejected() {
        let err = LessonDraft::new("L1", Vec::new()).validate().unwrap_err();
        assert_eq!(err, LessonError::Empty(LessonId::new("L1")));
    }

    #[test]
    fn invalid_question_reports_position() {
        let bad = QuestionDraft::new("Q", ["a", "b"], 9);
        let err = LessonDraft::new("L1", vec![draft_question(0), bad])
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            LessonError::InvalidQuestion { position: 1, .. }
        ));
    }

    #[test]
    fn reordered_keeps_identity() {
        let lesson = LessonDraft::new("L1", vec![draft_question(0), draft_question(1)])
            .with_title("Basics")
            .validate()
            .unwrap();
        let reversed = lesson.reordered(<[Question]>::reverse);

        assert_eq!(reversed.id(), lesson.id());
        assert_eq!(reversed.title(), "Basics");
        assert_eq!(reversed.question(0), lesson.question(1));
    }
}
