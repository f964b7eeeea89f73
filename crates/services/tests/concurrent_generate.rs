use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use quiz_core::model::{PoolMetadata, QuestionRecord, QuizSubmission, SessionId};
use services::{Clock, QuizManager};

fn build_pool(n: usize) -> Vec<QuestionRecord> {
    (0..n)
        .map(|i| QuestionRecord::new(format!("Q{i}"), BTreeMap::new(), "A", ""))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_generates_on_one_session_never_overlap() {
    let manager = Arc::new(QuizManager::in_memory(Clock::system()));
    let session = SessionId::from("shared");
    manager.ingest(&session, build_pool(40), PoolMetadata::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            manager.generate(&session, 5, false).unwrap()
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        let quiz = handle.await.unwrap();
        assert_eq!(quiz.count, 5);
        for q in quiz.questions {
            assert!(seen.insert(q.prompt), "question handed out twice");
        }
    }
    assert_eq!(seen.len(), 40);
    assert_eq!(manager.stats(&session).used_count, 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_get_dense_numbers() {
    let manager = Arc::new(QuizManager::in_memory(Clock::system()));
    let session = SessionId::from("history");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = Arc::clone(&manager);
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            manager.submit(&session, QuizSubmission::default()).quiz_number
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=16).collect::<Vec<u32>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sessions_progress_independently_under_load() {
    let manager = Arc::new(QuizManager::in_memory(Clock::system()));

    let mut handles = Vec::new();
    for s in 0..6 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            let session = SessionId::new(format!("user-{s}"));
            manager.ingest(&session, build_pool(10), PoolMetadata::new());
            for _ in 0..5 {
                manager.generate(&session, 2, false).unwrap();
            }
            manager.stats(&session)
        }));
    }

    for handle in handles {
        let stats = handle.await.unwrap();
        assert_eq!(stats.pool_size, 10);
        assert_eq!(stats.used_count, 10);
    }
}
