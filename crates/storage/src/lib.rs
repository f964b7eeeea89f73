#![forbid(unsafe_code)]

pub mod memory;
pub mod queue;
pub mod repository;

pub use queue::IndexQueue;
pub use repository::{DistributionQueues, HistoryLog, QuestionCache, Storage, UsageTracker};
