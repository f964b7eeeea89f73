use chrono::{DateTime, Utc};
use dashmap::DashMap;
use quiz_core::model::{HistoryEntry, QuizSubmission, SessionId};

use crate::repository::HistoryLog;

#[derive(Debug, Default)]
pub struct InMemoryHistoryLog {
    entries: DashMap<SessionId, Vec<HistoryEntry>>,
}

impl InMemoryHistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryLog for InMemoryHistoryLog {
    fn append(
        &self,
        session: &SessionId,
        submission: QuizSubmission,
        recorded_at: DateTime<Utc>,
    ) -> HistoryEntry {
        // The entry guard is held across len() and push(), keeping numbering dense.
        let mut log = self.entries.entry(session.clone()).or_default();
        let sequence_number = u32::try_from(log.len() + 1).unwrap_or(u32::MAX);
        let entry = HistoryEntry::record(sequence_number, submission, recorded_at);
        log.push(entry.clone());
        entry
    }

    fn all(&self, session: &SessionId) -> Vec<HistoryEntry> {
        self.entries
            .get(session)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    fn count(&self, session: &SessionId) -> usize {
        self.entries.get(session).map_or(0, |log| log.len())
    }

    fn last(&self, session: &SessionId) -> Option<HistoryEntry> {
        self.entries
            .get(session)
            .and_then(|log| log.last().cloned())
    }

    fn remove(&self, session: &SessionId) {
        self.entries.remove(session);
    }
}
