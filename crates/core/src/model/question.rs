use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Shape problems found by [`QuestionRecord::validate`].
///
/// `index` is 1-based so messages line up with how questions are numbered to users.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("no questions found")]
    EmptyPool,

    #[error("question {index} has an empty prompt")]
    EmptyPrompt { index: usize },

    #[error("question {index} missing required options (A, B, C, D)")]
    MissingOptions { index: usize },

    #[error("question {index} has invalid correct_answer: {label}")]
    InvalidCorrectAnswer { index: usize, label: String },
}

/// Labels every question is expected to carry.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

//
// ─── QUESTION RECORD ──────────────────────────────────────────────────────────
//

/// One multiple-choice question as produced by the upstream generator.
///
/// The session core stores and serves these as opaque values; shape checks live
/// in [`QuestionRecord::validate`] and are the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        options: BTreeMap<String, String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
        }
    }

    /// Option text for the given label, if present.
    #[must_use]
    pub fn option(&self, label: &str) -> Option<&str> {
        self.options.get(label).map(String::as_str)
    }

    /// Returns true when `answer` names the correct option.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    /// Check the four-option contract for a question at 1-based `index`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` describing the first problem found.
    pub fn validate(&self, index: usize) -> Result<(), QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { index });
        }
        if !OPTION_LABELS
            .iter()
            .all(|label| self.options.contains_key(*label))
        {
            return Err(QuestionError::MissingOptions { index });
        }
        if !OPTION_LABELS.contains(&self.correct_answer.as_str()) {
            return Err(QuestionError::InvalidCorrectAnswer {
                index,
                label: self.correct_answer.clone(),
            });
        }
        Ok(())
    }
}

/// Validate a whole pool before handing it to the session manager.
///
/// # Errors
///
/// Returns `QuestionError::EmptyPool` for an empty slice, otherwise the first
/// per-question error.
pub fn validate_pool(questions: &[QuestionRecord]) -> Result<(), QuestionError> {
    if questions.is_empty() {
        return Err(QuestionError::EmptyPool);
    }
    questions
        .iter()
        .enumerate()
        .try_for_each(|(i, q)| q.validate(i + 1))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
