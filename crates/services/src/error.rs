//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionId;

/// Errors emitted by `QuizManager`.
///
/// Capping, exhaustion, and empty history are handled with fallbacks and never
/// show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions cached for session {session}")]
    NotFound { session: SessionId },

    #[error("selected only {selected} of {requested} questions")]
    SelectionIncomplete { requested: usize, selected: usize },
}
