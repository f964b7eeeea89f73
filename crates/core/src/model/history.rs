use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("ended_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single quiz: {len}")]
    TooManyAnswers { len: usize },
}

//
// ─── ANSWERED QUESTION ────────────────────────────────────────────────────────
//

/// A served question together with what the user picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub prompt: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_spent_secs: Option<f64>,
}

impl AnsweredQuestion {
    /// Grade `user_answer` against the question's correct label.
    ///
    /// A missing answer counts as incorrect.
    #[must_use]
    pub fn grade(
        question: &QuestionRecord,
        user_answer: Option<&str>,
        time_spent_secs: Option<f64>,
    ) -> Self {
        let is_correct = user_answer.is_some_and(|a| question.is_correct(a));
        Self {
            prompt: question.prompt.clone(),
            user_answer: user_answer.map(str::to_owned),
            correct_answer: question.correct_answer.clone(),
            is_correct,
            time_spent_secs,
        }
    }
}

//
// ─── SUBMISSION ───────────────────────────────────────────────────────────────
//

/// Results of one completed quiz as reported by the caller.
///
/// Score and total are taken at face value; use [`QuizSubmission::from_answers`]
/// to derive them from graded answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub questions: Vec<AnsweredQuestion>,
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_time_secs: Option<f64>,
    #[serde(default)]
    pub per_question_time_secs: Vec<f64>,
}

impl QuizSubmission {
    /// Build a submission whose score is the number of correct answers.
    ///
    /// Per-question times are collected from answers that carry one; the total
    /// time is their sum unless both timestamps are present.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InvalidTimeRange` if `ended_at` precedes `started_at`.
    /// Returns `SubmissionError::TooManyAnswers` if the answer count cannot fit in `u32`.
    pub fn from_answers(
        questions: Vec<AnsweredQuestion>,
        started_at: Option<DateTime<Utc>>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<Self, SubmissionError> {
        let total_time_secs = match (started_at, ended_at) {
            (Some(start), Some(end)) if end < start => {
                return Err(SubmissionError::InvalidTimeRange);
            }
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        };

        let total = u32::try_from(questions.len())
            .map_err(|_| SubmissionError::TooManyAnswers { len: questions.len() })?;
        let mut score = 0_u32;
        for q in &questions {
            if q.is_correct {
                score = score.saturating_add(1);
            }
        }

        let per_question_time_secs: Vec<f64> =
            questions.iter().filter_map(|q| q.time_spent_secs).collect();
        let total_time_secs = total_time_secs.or_else(|| {
            (!per_question_time_secs.is_empty()).then(|| per_question_time_secs.iter().sum())
        });

        Ok(Self {
            questions,
            score,
            total,
            started_at,
            ended_at,
            total_time_secs,
            per_question_time_secs,
        })
    }
}

//
// ─── HISTORY ENTRY ────────────────────────────────────────────────────────────
//

/// Immutable record of one completed quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    sequence_number: u32,
    questions: Vec<AnsweredQuestion>,
    score: u32,
    total: u32,
    recorded_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    total_time_secs: Option<f64>,
    per_question_time_secs: Vec<f64>,
}

impl HistoryEntry {
    /// Freeze a submission as the `sequence_number`-th attempt of its session.
    #[must_use]
    pub fn record(
        sequence_number: u32,
        submission: QuizSubmission,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence_number,
            questions: submission.questions,
            score: submission.score,
            total: submission.total,
            recorded_at,
            started_at: submission.started_at,
            ended_at: submission.ended_at,
            total_time_secs: submission.total_time_secs,
            per_question_time_secs: submission.per_question_time_secs,
        }
    }

    /// 1-based position of this attempt in its session's history.
    #[must_use]
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    #[must_use]
    pub fn questions(&self) -> &[AnsweredQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn total_time_secs(&self) -> Option<f64> {
        self.total_time_secs
    }

    #[must_use]
    pub fn per_question_time_secs(&self) -> &[f64] {
        &self.per_question_time_secs
    }

    /// Score as a percentage of total, 0 when the quiz had no questions.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) / f64::from(self.total) * 100.0
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
