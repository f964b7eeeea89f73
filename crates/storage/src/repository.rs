use chrono::{DateTime, Utc};
use quiz_core::model::{
    CachedPool, HistoryEntry, PoolMetadata, QuestionRecord, QuizSubmission, SessionId,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::memory::{
    InMemoryDistributionQueues, InMemoryHistoryLog, InMemoryQuestionCache, InMemoryUsageTracker,
};
use crate::queue::IndexQueue;

/// Session → cached question pool.
///
/// An absent session is a normal state: lookups return empty values, never errors.
pub trait QuestionCache: Send + Sync {
    /// Replace any pool already cached for `session`.
    fn store(&self, session: &SessionId, pool: CachedPool);

    /// Questions for `session`, empty if none are cached.
    fn get(&self, session: &SessionId) -> Arc<[QuestionRecord]>;

    /// The whole cached entry, including metadata and ingest time.
    fn pool(&self, session: &SessionId) -> Option<CachedPool>;

    /// True iff a non-empty pool is cached.
    fn has(&self, session: &SessionId) -> bool;

    /// Pool metadata, empty if none is cached.
    fn metadata(&self, session: &SessionId) -> PoolMetadata;

    /// Drop the pool. Returns whether anything was removed.
    fn clear(&self, session: &SessionId) -> bool;

    /// Sessions whose pool was ingested strictly before `cutoff`.
    fn ingested_before(&self, cutoff: DateTime<Utc>) -> Vec<SessionId>;

    /// Number of sessions holding a pool.
    fn session_count(&self) -> usize;
}

/// Session → indices already served since the last exhaustion reset.
pub trait UsageTracker: Send + Sync {
    fn used(&self, session: &SessionId) -> HashSet<usize>;

    fn used_count(&self, session: &SessionId) -> usize;

    /// Add `index` to the used set. Idempotent.
    fn mark(&self, session: &SessionId, index: usize);

    /// Add every index in `indices` under a single entry lock.
    fn mark_all(&self, session: &SessionId, indices: &[usize]) {
        for &index in indices {
            self.mark(session, index);
        }
    }

    /// Empty the used set but keep tracking the session.
    fn clear(&self, session: &SessionId);

    /// Stop tracking the session entirely.
    fn remove(&self, session: &SessionId);
}

/// Session → staged shuffle of pool indices.
///
/// Callers take the queue out, consume it, and put back what is left. Sequencing
/// across those calls is the caller's job.
pub trait DistributionQueues: Send + Sync {
    /// Replace the session's queue with a fresh shuffle of `0..pool_size`.
    fn reseed(&self, session: &SessionId, pool_size: usize);

    /// Remove and return the session's queue, empty if there is none.
    fn take(&self, session: &SessionId) -> IndexQueue;

    fn put(&self, session: &SessionId, queue: IndexQueue);

    /// Entries still staged for the session.
    fn len(&self, session: &SessionId) -> usize;

    fn contains(&self, session: &SessionId) -> bool;

    fn remove(&self, session: &SessionId);
}

/// Session → append-only log of completed attempts.
pub trait HistoryLog: Send + Sync {
    /// Record `submission` as the next attempt and return the stored entry.
    ///
    /// The sequence number is the session's current count plus one.
    fn append(
        &self,
        session: &SessionId,
        submission: QuizSubmission,
        recorded_at: DateTime<Utc>,
    ) -> HistoryEntry;

    /// All entries in append order.
    fn all(&self, session: &SessionId) -> Vec<HistoryEntry>;

    fn count(&self, session: &SessionId) -> usize;

    fn last(&self, session: &SessionId) -> Option<HistoryEntry>;

    /// Forget the whole log. Only eviction uses this; resets never do.
    fn remove(&self, session: &SessionId);
}

/// The four session stores behind trait objects so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionCache>,
    pub usage: Arc<dyn UsageTracker>,
    pub queues: Arc<dyn DistributionQueues>,
    pub history: Arc<dyn HistoryLog>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            questions: Arc::new(InMemoryQuestionCache::new()),
            usage: Arc::new(InMemoryUsageTracker::new()),
            queues: Arc::new(InMemoryDistributionQueues::new()),
            history: Arc::new(InMemoryHistoryLog::new()),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}
