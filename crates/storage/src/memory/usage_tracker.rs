use dashmap::DashMap;
use quiz_core::model::SessionId;
use std::collections::HashSet;

use crate::repository::UsageTracker;

#[derive(Debug, Default)]
pub struct InMemoryUsageTracker {
    used: DashMap<SessionId, HashSet<usize>>,
}

impl InMemoryUsageTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageTracker for InMemoryUsageTracker {
    fn used(&self, session: &SessionId) -> HashSet<usize> {
        self.used
            .get(session)
            .map(|set| set.value().clone())
            .unwrap_or_default()
    }

    fn used_count(&self, session: &SessionId) -> usize {
        self.used.get(session).map_or(0, |set| set.len())
    }

    fn mark(&self, session: &SessionId, index: usize) {
        self.used.entry(session.clone()).or_default().insert(index);
    }

    fn mark_all(&self, session: &SessionId, indices: &[usize]) {
        self.used
            .entry(session.clone())
            .or_default()
            .extend(indices.iter().copied());
    }

    fn clear(&self, session: &SessionId) {
        self.used.entry(session.clone()).or_default().clear();
    }

    fn remove(&self, session: &SessionId) {
        self.used.remove(session);
    }
}
