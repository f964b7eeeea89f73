use dashmap::DashMap;
use quiz_core::model::SessionId;

use crate::queue::IndexQueue;
use crate::repository::DistributionQueues;

#[derive(Debug, Default)]
pub struct InMemoryDistributionQueues {
    queues: DashMap<SessionId, IndexQueue>,
}

impl InMemoryDistributionQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DistributionQueues for InMemoryDistributionQueues {
    fn reseed(&self, session: &SessionId, pool_size: usize) {
        self.queues
            .insert(session.clone(), IndexQueue::shuffled(pool_size));
    }

    fn take(&self, session: &SessionId) -> IndexQueue {
        self.queues
            .remove(session)
            .map(|(_, queue)| queue)
            .unwrap_or_default()
    }

    fn put(&self, session: &SessionId, queue: IndexQueue) {
        self.queues.insert(session.clone(), queue);
    }

    fn len(&self, session: &SessionId) -> usize {
        self.queues.get(session).map_or(0, |q| q.len())
    }

    fn contains(&self, session: &SessionId) -> bool {
        self.queues.contains_key(session)
    }

    fn remove(&self, session: &SessionId) {
        self.queues.remove(session);
    }
}
