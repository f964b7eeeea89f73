//! In-memory stores backed by `DashMap`, so each session entry locks independently.

mod distribution_queues;
mod history_log;
mod question_cache;
mod usage_tracker;

pub use distribution_queues::InMemoryDistributionQueues;
pub use history_log::InMemoryHistoryLog;
pub use question_cache::InMemoryQuestionCache;
pub use usage_tracker::InMemoryUsageTracker;
