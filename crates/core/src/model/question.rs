use serde::Deserialize;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("option {index} cannot be empty")]
    BlankOption { index: usize },

    #[error("correct index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

/// Minimum number of options a multiple-choice question must offer.
pub const MIN_OPTIONS: usize = 2;

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in lesson files.
///
/// Field names follow the lesson file format (`question`, `options`, `correct`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correct", alias = "correctIndex")]
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_index: usize,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_index,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are too few options,
    /// an option is blank, or the correct index does not point at an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        if self.options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                min: MIN_OPTIONS,
                got: self.options.len(),
            });
        }

        if let Some(index) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::BlankOption { index });
        }

        if self.correct_index >= self.options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: self.correct_index,
                len: self.options.len(),
            });
        }

        let explanation = self
            .explanation
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Question {
            prompt,
            options: self.options,
            correct_index: self.correct_index,
            explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// `correct_index` always points at an entry of `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Returns true if `option` is the correct answer.
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_draft_produces_question() {
        let q = QuestionDraft::new("  2 + 2?  ", ["3", "4", "5"], 1)
            .with_explanation("Basic addition.")
            .validate()
            .unwrap();

        assert_eq!(q.prompt(), "2 + 2?");
        assert_eq!(q.option_count(), 3);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.explanation(), Some("Basic addition."));
    }

    #[test]
    fn correct_index_must_be_in_range() {
        let err = QuestionDraft::new("Q", ["a", "b"], 2).validate().unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn rejects_blank_prompt_and_options() {
        assert_eq!(
            QuestionDraft::new(" ", ["a", "b"], 0).validate().unwrap_err(),
            QuestionError::EmptyPrompt
        );
        assert_eq!(
            QuestionDraft::new("Q", ["a"], 0).validate().unwrap_err(),
            QuestionError::TooFewOptions { min: 2, got: 1 }
        );
        assert_eq!(
            QuestionDraft::new("Q", ["a", " "], 0).validate().unwrap_err(),
            QuestionError::BlankOption { index: 1 }
        );
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = QuestionDraft::new("Q", ["a", "b"], 0)
            .with_explanation("   ")
            .validate()
            .unwrap();
        assert_eq!(q.explanation(), None);
    }
}
