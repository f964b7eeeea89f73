mod locks;
mod manager;
mod selection;
mod view;

// Public API of the session subsystem.
pub use crate::error::QuizError;
pub use manager::QuizManager;
pub use selection::{Selection, Shortfall, select_indices};
pub use view::{GeneratedQuiz, IngestOutcome, ResetOutcome, SubmitOutcome};
