#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use config::ManagerConfig;
pub use error::QuizError;
pub use sessions::{GeneratedQuiz, IngestOutcome, QuizManager, ResetOutcome, SubmitOutcome};
