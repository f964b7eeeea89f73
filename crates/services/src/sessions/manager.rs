use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{
    CachedPool, HistoryEntry, PoolMetadata, QuestionRecord, QuizSubmission, SessionAnalytics,
    SessionId, SessionStats,
};
use storage::{IndexQueue, Storage};

use super::locks::SessionLocks;
use super::selection::{Shortfall, select_indices};
use super::view::{GeneratedQuiz, IngestOutcome, ResetOutcome, SubmitOutcome};
use crate::config::ManagerConfig;
use crate::error::QuizError;

/// Coordinates the question cache, usage tracker, distribution queues, and
/// history log for every session.
///
/// Build one at startup and share it (`Arc<QuizManager>`) with request
/// handlers. Every operation on a session runs under that session's lock;
/// operations on different sessions proceed independently.
pub struct QuizManager {
    storage: Storage,
    locks: SessionLocks,
    config: ManagerConfig,
    clock: Clock,
}

impl QuizManager {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock, config: ManagerConfig) -> Self {
        Self {
            storage,
            locks: SessionLocks::new(),
            config,
            clock,
        }
    }

    /// Manager over fresh in-memory stores with default limits.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Storage::in_memory(), clock, ManagerConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Cache `questions` for `session`, replacing any previous pool.
    ///
    /// Usage tracking starts over and the distribution queue is re-seeded.
    /// History is kept.
    pub fn ingest(
        &self,
        session: &SessionId,
        questions: Vec<QuestionRecord>,
        metadata: PoolMetadata,
    ) -> IngestOutcome {
        self.locks.with_session(session, || {
            let pool_size = questions.len();
            if pool_size == 0 {
                warn!(session = %session, "Ingesting an empty question pool");
            }

            let pool = CachedPool::new(questions, metadata, self.clock.now());
            self.storage.questions.store(session, pool);
            self.storage.usage.clear(session);
            self.storage.queues.reseed(session, pool_size);

            info!(session = %session, pool_size, "Question pool ingested");
            IngestOutcome { pool_size }
        })
    }

    /// Draw a quiz of up to `count` questions from the session's pool.
    ///
    /// Without `allow_repeats`, questions are not served again until the pool
    /// runs out; a request that cannot be met from unused questions starts the
    /// rotation over. Requests larger than the pool are capped.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFound` if no non-empty pool is cached.
    /// Returns `QuizError::SelectionIncomplete` if the draw bound was hit; nothing
    /// is marked used in that case.
    pub fn generate(
        &self,
        session: &SessionId,
        count: usize,
        allow_repeats: bool,
    ) -> Result<GeneratedQuiz, QuizError> {
        self.locks
            .with_session(session, || self.generate_locked(session, count, allow_repeats))
    }

    fn generate_locked(
        &self,
        session: &SessionId,
        requested: usize,
        allow_repeats: bool,
    ) -> Result<GeneratedQuiz, QuizError> {
        if !self.storage.questions.has(session) {
            return Err(QuizError::NotFound {
                session: session.clone(),
            });
        }

        let questions = self.storage.questions.get(session);
        let pool_size = questions.len();

        let mut count = requested;
        if count > pool_size {
            warn!(
                session = %session,
                requested,
                pool_size,
                "Requested more questions than the pool holds, capping"
            );
            count = pool_size;
        }

        let (used, mut queue) = if allow_repeats {
            (HashSet::new(), IndexQueue::shuffled(pool_size))
        } else {
            (
                self.storage.usage.used(session),
                self.storage.queues.take(session),
            )
        };

        let selection = match select_indices(&mut queue, &used, pool_size, count, allow_repeats) {
            Ok(selection) => selection,
            Err(Shortfall {
                requested,
                selected,
            }) => {
                if !allow_repeats {
                    self.storage.queues.reseed(session, pool_size);
                }
                warn!(
                    session = %session,
                    requested,
                    selected,
                    "Selection ended short of the requested size"
                );
                return Err(QuizError::SelectionIncomplete {
                    requested,
                    selected,
                });
            }
        };

        if !allow_repeats {
            if selection.exhausted {
                warn!(
                    session = %session,
                    unused = pool_size.saturating_sub(used.len()),
                    needed = count,
                    "Question pool exhausted, starting a new rotation"
                );
                self.storage.usage.clear(session);
            }
            self.storage.usage.mark_all(session, &selection.indices);
            self.storage.queues.put(session, queue);
        }

        let mut picked: Vec<QuestionRecord> = selection
            .indices
            .iter()
            .map(|&i| questions[i].clone())
            .collect();
        picked.as_mut_slice().shuffle(&mut rng());

        let remaining = if allow_repeats {
            pool_size
        } else {
            pool_size.saturating_sub(self.storage.usage.used_count(session))
        };
        let quiz_number =
            u32::try_from(self.storage.history.count(session) + 1).unwrap_or(u32::MAX);

        debug!(
            session = %session,
            count = picked.len(),
            pool_size,
            remaining,
            allow_repeats,
            "Generated quiz"
        );

        Ok(GeneratedQuiz {
            count: picked.len(),
            questions: picked,
            quiz_number,
            remaining,
        })
    }

    /// Append a completed attempt to the session's history.
    pub fn submit(&self, session: &SessionId, submission: QuizSubmission) -> SubmitOutcome {
        self.locks.with_session(session, || {
            let entry = self
                .storage
                .history
                .append(session, submission, self.clock.now());
            info!(
                session = %session,
                quiz_number = entry.sequence_number(),
                score = entry.score(),
                total = entry.total(),
                "Quiz results recorded"
            );
            SubmitOutcome {
                quiz_number: entry.sequence_number(),
            }
        })
    }

    /// Aggregate view over pool, usage, and history. Unknown sessions read as zeros.
    #[must_use]
    pub fn stats(&self, session: &SessionId) -> SessionStats {
        self.locks.with_session(session, || {
            SessionStats::from_parts(
                self.storage.questions.get(session).len(),
                self.storage.usage.used_count(session),
                self.storage.history.all(session),
            )
        })
    }

    /// Per-quiz scores, timing, and accuracy trend. `None` until something is submitted.
    #[must_use]
    pub fn analytics(&self, session: &SessionId) -> Option<SessionAnalytics> {
        let history = self
            .locks
            .with_session(session, || self.storage.history.all(session));
        SessionAnalytics::from_history(&history)
    }

    #[must_use]
    pub fn last_attempt(&self, session: &SessionId) -> Option<HistoryEntry> {
        self.locks
            .with_session(session, || self.storage.history.last(session))
    }

    #[must_use]
    pub fn has_pool(&self, session: &SessionId) -> bool {
        self.locks
            .with_session(session, || self.storage.questions.has(session))
    }

    /// Number of sessions currently holding a pool. Spans all sessions, so it
    /// takes no session lock and may be stale by the time it returns.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.storage.questions.session_count()
    }

    /// Start the session's rotation over.
    ///
    /// With `keep_cache`, the pool stays and only usage and queue are reset (a
    /// session without a pool is left alone). Without it, pool, usage, and queue
    /// are dropped. History survives either way.
    pub fn reset(&self, session: &SessionId, keep_cache: bool) -> ResetOutcome {
        self.locks.with_session(session, || {
            if keep_cache {
                if self.storage.questions.has(session) {
                    let pool_size = self.storage.questions.get(session).len();
                    self.storage.usage.clear(session);
                    self.storage.queues.reseed(session, pool_size);
                }
            } else {
                self.storage.questions.clear(session);
                self.storage.usage.remove(session);
                self.storage.queues.remove(session);
            }
            info!(session = %session, keep_cache, "Session reset");
            ResetOutcome {
                cache_preserved: keep_cache,
            }
        })
    }

    /// Forget everything about a session, history included.
    ///
    /// Never called implicitly. Returns whether the session held a pool or history.
    pub fn evict(&self, session: &SessionId) -> bool {
        let existed = self
            .locks
            .with_session(session, || self.evict_locked(session));
        self.locks.forget(session);
        if existed {
            info!(session = %session, "Session evicted");
        }
        existed
    }

    /// Evict every session whose pool was ingested before `cutoff`.
    ///
    /// Returns the sessions actually evicted. A session re-ingested after the
    /// candidate scan is left alone.
    pub fn evict_ingested_before(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        let evicted: Vec<SessionId> = self
            .storage
            .questions
            .ingested_before(cutoff)
            .into_iter()
            .filter(|session| self.evict_if_ingested_before(session, cutoff))
            .collect();
        if !evicted.is_empty() {
            info!(evicted = evicted.len(), cutoff = %cutoff, "Evicted stale sessions");
        }
        evicted
    }

    /// Evict `session` only if its current pool predates `cutoff`.
    fn evict_if_ingested_before(&self, session: &SessionId, cutoff: DateTime<Utc>) -> bool {
        let evicted = self.locks.with_session(session, || {
            let stale = self
                .storage
                .questions
                .pool(session)
                .is_some_and(|p| p.ingested_at() < cutoff);
            if stale {
                self.evict_locked(session);
            } else {
                debug!(session = %session, "Session re-ingested since scan, keeping it");
            }
            stale
        });
        if evicted {
            self.locks.forget(session);
        }
        evicted
    }

    fn evict_locked(&self, session: &SessionId) -> bool {
        let had_history = self.storage.history.count(session) > 0;
        let had_pool = self.storage.questions.clear(session);
        self.storage.usage.remove(session);
        self.storage.queues.remove(session);
        self.storage.history.remove(session);
        had_pool || had_history
    }
}

impl fmt::Debug for QuizManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizManager")
            .field("sessions", &self.session_count())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::OPTION_LABELS;
    use quiz_core::time::{fixed_clock, fixed_now};
    use std::collections::BTreeMap;

    fn pool(n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| {
                let options: BTreeMap<String, String> = OPTION_LABELS
                    .iter()
                    .map(|l| ((*l).to_owned(), format!("{l}{i}")))
                    .collect();
                QuestionRecord::new(format!("Q{i}"), options, "A", format!("E{i}"))
            })
            .collect()
    }

    fn prompts(quiz: &GeneratedQuiz) -> HashSet<String> {
        quiz.questions.iter().map(|q| q.prompt.clone()).collect()
    }

    fn manager_with(n: usize) -> (QuizManager, SessionId) {
        let manager = QuizManager::in_memory(fixed_clock());
        let id = SessionId::from("session");
        manager.ingest(&id, pool(n), PoolMetadata::new());
        (manager, id)
    }

    #[test]
    fn generate_without_pool_is_not_found() {
        let manager = QuizManager::in_memory(fixed_clock());
        let id = SessionId::from("nobody");
        let err = manager.generate(&id, 3, false).unwrap_err();
        assert_eq!(err, QuizError::NotFound { session: id });
    }

    #[test]
    fn empty_pool_counts_as_missing() {
        let (manager, id) = manager_with(0);
        assert!(matches!(
            manager.generate(&id, 1, false),
            Err(QuizError::NotFound { .. })
        ));
    }

    #[test]
    fn consecutive_quizzes_do_not_overlap_until_exhausted() {
        let (manager, id) = manager_with(12);
        let a = manager.generate(&id, 4, false).unwrap();
        let b = manager.generate(&id, 4, false).unwrap();
        let c = manager.generate(&id, 4, false).unwrap();

        let (pa, pb, pc) = (prompts(&a), prompts(&b), prompts(&c));
        assert_eq!(pa.len(), 4);
        assert!(pa.is_disjoint(&pb));
        assert!(pa.is_disjoint(&pc));
        assert!(pb.is_disjoint(&pc));

        assert_eq!(a.remaining, 8);
        assert_eq!(b.remaining, 4);
        assert_eq!(c.remaining, 0);
    }

    #[test]
    fn oversized_request_is_capped_to_pool() {
        let (manager, id) = manager_with(5);
        let quiz = manager.generate(&id, 9, false).unwrap();
        assert_eq!(quiz.count, 5);
        assert_eq!(prompts(&quiz).len(), 5);
    }

    #[test]
    fn large_pool_returns_whole_pool_for_oversized_request() {
        let (manager, id) = manager_with(50);
        let quiz = manager.generate(&id, 60, false).unwrap();
        assert_eq!(quiz.count, 50);
        assert_eq!(prompts(&quiz).len(), 50);

        let repeat = manager.generate(&id, 45, true).unwrap();
        assert_eq!(repeat.count, 45);
        assert_eq!(manager.generate(&id, 60, true).unwrap().count, 50);
    }

    #[test]
    fn configured_max_does_not_cap_generation() {
        let manager = QuizManager::new(
            Storage::in_memory(),
            fixed_clock(),
            ManagerConfig::default().with_max_quiz_size(3),
        );
        let id = SessionId::from("s");
        manager.ingest(&id, pool(10), PoolMetadata::new());
        assert_eq!(manager.generate(&id, 8, false).unwrap().count, 8);
    }

    #[test]
    fn short_selection_marks_nothing_and_reseeds_queue() {
        let (manager, id) = manager_with(5);
        manager
            .storage()
            .queues
            .put(&id, IndexQueue::from_order([99; 20]));

        let err = manager.generate(&id, 3, false).unwrap_err();
        assert_eq!(
            err,
            QuizError::SelectionIncomplete {
                requested: 3,
                selected: 0
            }
        );
        assert_eq!(manager.storage().usage.used_count(&id), 0);
        assert_eq!(manager.storage().queues.len(&id), 5);

        // The reseeded queue serves the next request normally.
        assert_eq!(manager.generate(&id, 3, false).unwrap().count, 3);
    }

    #[test]
    fn partial_exhaustion_recycles_without_internal_duplicates() {
        let (manager, id) = manager_with(5);
        manager.generate(&id, 3, false).unwrap();
        let second = manager.generate(&id, 3, false).unwrap();

        assert_eq!(second.count, 3);
        assert_eq!(prompts(&second).len(), 3);
        assert_eq!(manager.stats(&id).used_count, 3);
    }

    #[test]
    fn full_exhaustion_starts_new_rotation() {
        let (manager, id) = manager_with(10);
        let all = manager.generate(&id, 10, false).unwrap();
        assert_eq!(all.remaining, 0);

        let next = manager.generate(&id, 1, false).unwrap();
        assert_eq!(next.count, 1);
        assert_eq!(next.remaining, 9);
    }

    #[test]
    fn repeats_do_not_touch_usage() {
        let (manager, id) = manager_with(4);
        manager.generate(&id, 2, false).unwrap();
        let quiz = manager.generate(&id, 4, true).unwrap();

        assert_eq!(prompts(&quiz).len(), 4);
        assert_eq!(quiz.remaining, 4);
        assert_eq!(manager.stats(&id).used_count, 2);
    }

    #[test]
    fn zero_count_returns_empty_quiz() {
        let (manager, id) = manager_with(4);
        let quiz = manager.generate(&id, 0, false).unwrap();
        assert_eq!(quiz.count, 0);
        assert_eq!(quiz.remaining, 4);
    }

    #[test]
    fn quiz_number_previews_next_submission() {
        let (manager, id) = manager_with(6);
        assert_eq!(manager.generate(&id, 2, false).unwrap().quiz_number, 1);
        assert_eq!(manager.generate(&id, 2, false).unwrap().quiz_number, 1);

        let preview = manager.generate(&id, 2, false).unwrap().quiz_number;
        let outcome = manager.submit(&id, QuizSubmission::default());
        assert_eq!(outcome.quiz_number, preview);
        assert_eq!(manager.generate(&id, 2, false).unwrap().quiz_number, 2);
    }

    #[test]
    fn reingest_clears_usage() {
        let (manager, id) = manager_with(6);
        manager.generate(&id, 4, false).unwrap();
        manager.ingest(&id, pool(3), PoolMetadata::new());

        let stats = manager.stats(&id);
        assert_eq!(stats.pool_size, 3);
        assert_eq!(stats.used_count, 0);
        assert_eq!(manager.storage().queues.len(&id), 3);
    }

    #[test]
    fn submit_numbers_are_sequential_and_stats_follow() {
        let (manager, id) = manager_with(3);
        let stats = manager.stats(&id);
        assert_eq!(stats.quizzes_taken, 0);
        assert_eq!(stats.average_score, 0.0);

        for (i, score) in [2_u32, 3, 1].into_iter().enumerate() {
            let outcome = manager.submit(
                &id,
                QuizSubmission {
                    score,
                    total: 3,
                    ..QuizSubmission::default()
                },
            );
            assert_eq!(outcome.quiz_number as usize, i + 1);
            assert_eq!(
                manager.last_attempt(&id).map(|e| e.sequence_number()),
                Some(outcome.quiz_number)
            );
        }

        let stats = manager.stats(&id);
        assert_eq!(stats.quizzes_taken, 3);
        assert_eq!(stats.average_score, 2.0);
        assert_eq!(stats.history[2].score(), 1);
        assert_eq!(manager.last_attempt(&id).map(|e| e.sequence_number()), Some(3));
    }

    #[test]
    fn soft_reset_keeps_pool_and_clears_usage() {
        let (manager, id) = manager_with(5);
        manager.generate(&id, 3, false).unwrap();
        manager.submit(&id, QuizSubmission::default());

        let outcome = manager.reset(&id, true);
        assert!(outcome.cache_preserved);
        assert!(manager.has_pool(&id));

        let stats = manager.stats(&id);
        assert_eq!(stats.pool_size, 5);
        assert_eq!(stats.used_count, 0);
        assert_eq!(stats.remaining, 5);
        assert_eq!(stats.quizzes_taken, 1);
    }

    #[test]
    fn hard_reset_drops_pool_but_keeps_history() {
        let (manager, id) = manager_with(5);
        manager.generate(&id, 2, false).unwrap();
        manager.submit(&id, QuizSubmission::default());

        let outcome = manager.reset(&id, false);
        assert!(!outcome.cache_preserved);
        assert!(!manager.has_pool(&id));
        assert!(!manager.storage().queues.contains(&id));

        let stats = manager.stats(&id);
        assert_eq!(stats.pool_size, 0);
        assert_eq!(stats.used_count, 0);
        assert_eq!(stats.quizzes_taken, 1);
        assert!(matches!(
            manager.generate(&id, 1, false),
            Err(QuizError::NotFound { .. })
        ));
    }

    #[test]
    fn soft_reset_without_pool_is_noop() {
        let manager = QuizManager::in_memory(fixed_clock());
        let id = SessionId::from("ghost");
        assert!(manager.reset(&id, true).cache_preserved);
        assert_eq!(manager.stats(&id), SessionStats::empty());
        assert!(!manager.storage().queues.contains(&id));
    }

    #[test]
    fn analytics_follow_history() {
        let (manager, id) = manager_with(3);
        assert!(manager.analytics(&id).is_none());

        manager.submit(
            &id,
            QuizSubmission {
                score: 1,
                total: 2,
                ..QuizSubmission::default()
            },
        );
        let report = manager.analytics(&id).unwrap();
        assert_eq!(report.summary.total_quizzes, 1);
        assert_eq!(report.summary.overall_accuracy, 50.0);
    }

    #[test]
    fn evict_removes_everything() {
        let (manager, id) = manager_with(3);
        manager.submit(&id, QuizSubmission::default());

        assert!(manager.evict(&id));
        assert!(!manager.has_pool(&id));
        assert_eq!(manager.stats(&id), SessionStats::empty());
        assert!(!manager.evict(&SessionId::from("unknown")));
    }

    #[test]
    fn evict_ingested_before_uses_ingest_time() {
        let (manager, id) = manager_with(3);
        assert!(manager
            .evict_ingested_before(fixed_now() - Duration::seconds(1))
            .is_empty());

        let evicted = manager.evict_ingested_before(fixed_now() + Duration::seconds(1));
        assert_eq!(evicted, vec![id.clone()]);
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn evict_skips_session_reingested_after_scan() {
        let (manager, id) = manager_with(3);
        manager.submit(&id, QuizSubmission::default());
        let cutoff = fixed_now() + Duration::seconds(1);
        assert_eq!(
            manager.storage().questions.ingested_before(cutoff),
            vec![id.clone()]
        );

        // A fresh ingest lands between the scan and the eviction.
        let later = cutoff + Duration::seconds(1);
        let fresh = CachedPool::new(pool(4), PoolMetadata::new(), later);
        manager.storage().questions.store(&id, fresh);

        assert!(!manager.evict_if_ingested_before(&id, cutoff));
        assert!(manager.has_pool(&id));
        assert_eq!(manager.stats(&id).pool_size, 4);
        assert_eq!(manager.stats(&id).quizzes_taken, 1);
    }

    #[test]
    fn submit_records_clock_time() {
        let (manager, id) = manager_with(1);
        manager.submit(&id, QuizSubmission::default());
        assert_eq!(
            manager.last_attempt(&id).map(|e| e.recorded_at()),
            Some(fixed_now())
        );
    }
}
