use thiserror::Error;

use crate::model::{QuestionError, SubmissionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
