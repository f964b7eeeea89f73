mod history;
mod ids;
mod pool;
mod question;
mod stats;

pub use history::{AnsweredQuestion, HistoryEntry, QuizSubmission, SubmissionError};
pub use ids::SessionId;
pub use pool::{CachedPool, PoolMetadata};
pub use question::{OPTION_LABELS, QuestionError, QuestionRecord, validate_pool};
pub use stats::{
    AnalyticsSummary, QuizScore, QuizTiming, SessionAnalytics, SessionStats, TimeStats,
    TrendPoint, round2,
};
