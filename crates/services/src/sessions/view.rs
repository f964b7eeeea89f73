use serde::Serialize;

use quiz_core::model::QuestionRecord;

/// Result of caching a pool for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    pub pool_size: usize,
}

/// A freshly generated quiz. Nothing about it is stored until it is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuiz {
    pub questions: Vec<QuestionRecord>,
    pub count: usize,
    /// Preview of the number the attempt will get once submitted.
    pub quiz_number: u32,
    /// Unused questions left in the pool, or the pool size when repeats are allowed.
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub quiz_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetOutcome {
    pub cache_preserved: bool,
}
