use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::QuestionRecord;

/// Free-form description of where a pool came from (file name, topic, ...).
pub type PoolMetadata = BTreeMap<String, String>;

/// The question pool cached for one session.
///
/// Questions sit behind an `Arc` so readers can hold the pool without copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPool {
    questions: Arc<[QuestionRecord]>,
    metadata: PoolMetadata,
    ingested_at: DateTime<Utc>,
}

impl CachedPool {
    #[must_use]
    pub fn new(
        questions: Vec<QuestionRecord>,
        metadata: PoolMetadata,
        ingested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            questions: questions.into(),
            metadata,
            ingested_at,
        }
    }

    #[must_use]
    pub fn questions(&self) -> Arc<[QuestionRecord]> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn ingested_at(&self) -> DateTime<Utc> {
        self.ingested_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
