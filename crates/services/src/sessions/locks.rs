use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use quiz_core::model::SessionId;

/// One mutex per session so compound read-modify-write steps on a session's
/// stores appear atomic. Different sessions never contend.
#[derive(Debug, Default)]
pub(crate) struct SessionLocks {
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the session's lock.
    pub(crate) fn with_session<R>(&self, session: &SessionId, f: impl FnOnce() -> R) -> R {
        // Clone the Arc out so the DashMap shard guard is released before blocking.
        let lock = Arc::clone(self.locks.entry(session.clone()).or_default().value());
        let _guard = lock.lock();
        f()
    }

    /// Drop the session's mutex if nobody else holds a handle to it.
    pub(crate) fn forget(&self, session: &SessionId) {
        self.locks
            .remove_if(session, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}
