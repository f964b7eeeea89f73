use chrono::{DateTime, Utc};
use dashmap::DashMap;
use quiz_core::model::{CachedPool, PoolMetadata, QuestionRecord, SessionId};
use std::sync::Arc;
use tracing::debug;

use crate::repository::QuestionCache;

#[derive(Debug, Default)]
pub struct InMemoryQuestionCache {
    pools: DashMap<SessionId, CachedPool>,
}

impl InMemoryQuestionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuestionCache for InMemoryQuestionCache {
    fn store(&self, session: &SessionId, pool: CachedPool) {
        debug!(session = %session, questions = pool.len(), "Cached question pool");
        self.pools.insert(session.clone(), pool);
    }

    fn get(&self, session: &SessionId) -> Arc<[QuestionRecord]> {
        self.pools
            .get(session)
            .map_or_else(|| Arc::<[QuestionRecord]>::from(Vec::new()), |p| p.questions())
    }

    fn pool(&self, session: &SessionId) -> Option<CachedPool> {
        self.pools.get(session).map(|p| p.value().clone())
    }

    fn has(&self, session: &SessionId) -> bool {
        self.pools.get(session).is_some_and(|p| !p.is_empty())
    }

    fn metadata(&self, session: &SessionId) -> PoolMetadata {
        self.pools
            .get(session)
            .map(|p| p.metadata().clone())
            .unwrap_or_default()
    }

    fn clear(&self, session: &SessionId) -> bool {
        let removed = self.pools.remove(session).is_some();
        if removed {
            debug!(session = %session, "Cleared question pool");
        }
        removed
    }

    fn ingested_before(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        self.pools
            .iter()
            .filter(|entry| entry.value().ingested_at() < cutoff)
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn session_count(&self) -> usize {
        self.pools.len()
    }
}
