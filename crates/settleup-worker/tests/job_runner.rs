//! Job runner end-to-end: queue message -> stored ledger -> stored results.

use std::sync::Arc;
use std::time::Duration;

use settleup_core::compute_settlement_digest;
use settleup_types::{Settlement, SettleError, WorkerConfig};
use settleup_worker::{
    FsObjectStore, InMemoryObjectStore, InMemoryQueue, JobMessage, JobRunner, ObjectStore,
    PollReport, QueueMessage, SpoolQueue, StoreError, WorkerError,
};
use tokio::sync::watch;

const TRIANGLE: &str = "Alice,Bob,100\nBob,Charlie,200\nCharlie,Alice,300\n";

fn memory_runner() -> (
    Arc<InMemoryObjectStore>,
    Arc<InMemoryQueue>,
    JobRunner<InMemoryObjectStore, InMemoryQueue>,
) {
    let store = Arc::new(InMemoryObjectStore::new());
    let queue = Arc::new(InMemoryQueue::new());
    let runner = JobRunner::new(Arc::clone(&store), Arc::clone(&queue))
        .with_polling(5, Duration::ZERO);
    (store, queue, runner)
}

fn message(body: &str) -> QueueMessage {
    QueueMessage {
        message_id: "m-1".into(),
        receipt_handle: "r-1".into(),
        body: body.into(),
    }
}

#[tokio::test]
async fn settles_and_acknowledges() {
    let (store, queue, runner) = memory_runner();
    store.put("debts-1", TRIANGLE.as_bytes().to_vec()).await.unwrap();
    queue.send(JobMessage::new("debts-1").to_body()).await;

    let report = runner.run_until_idle().await.unwrap();
    assert_eq!(
        report,
        PollReport {
            received: 1,
            acknowledged: 1,
            failed: 0
        }
    );

    let stored = store.get("debts-1_results").await.unwrap();
    assert_eq!(
        String::from_utf8(stored).unwrap(),
        "Bob,Alice,100\nCharlie,Alice,100\n"
    );
    assert_eq!(queue.ready_len().await, 0);
    assert_eq!(queue.in_flight_len().await, 0);
}

#[tokio::test]
async fn process_message_reports_outcome() {
    let (store, _queue, runner) = memory_runner();
    store
        .put(
            "group",
            b"Alice,Bob,10\nBob,Alice,5\nCharlie,Bob,5\nJohn,Michael,13\n".to_vec(),
        )
        .await
        .unwrap();

    let outcome = runner
        .process_message(&message(r#"{"debts_id":"group"}"#))
        .await
        .unwrap();
    assert_eq!(outcome.results_key, "group_results");
    assert_eq!(outcome.transactions, 4);
    assert_eq!(outcome.settlements, 3);
    assert_eq!(
        outcome.digest,
        compute_settlement_digest(&[
            Settlement::new("John", "Michael", 13),
            Settlement::new("Alice", "Bob", 5),
            Settlement::new("Charlie", "Bob", 5),
        ])
    );
}

#[tokio::test]
async fn reprocessing_is_idempotent() {
    let (store, _queue, runner) = memory_runner();
    store.put("debts-1", TRIANGLE.as_bytes().to_vec()).await.unwrap();
    let msg = message(r#"{"debts_id":"debts-1"}"#);

    let first = runner.process_message(&msg).await.unwrap();
    let first_bytes = store.get("debts-1_results").await.unwrap();
    let second = runner.process_message(&msg).await.unwrap();
    let second_bytes = store.get("debts-1_results").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn missing_ledger_leaves_message_unacknowledged() {
    let (store, queue, runner) = memory_runner();
    queue.send(JobMessage::new("ghost").to_body()).await;

    let report = runner.poll_once().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.acknowledged, 0);
    assert_eq!(queue.in_flight_len().await, 1);
    assert!(store.is_empty().await);

    let err = runner
        .process_message(&message(r#"{"debts_id":"ghost"}"#))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn malformed_ledger_stores_nothing() {
    let (store, queue, runner) = memory_runner();
    store.put("bad", b"Alice,Bob,100\nBob,Bob,5\n".to_vec()).await.unwrap();
    queue.send(JobMessage::new("bad").to_body()).await;

    let report = runner.run_until_idle().await.unwrap();
    assert_eq!(report.failed, 1);
    assert!(!store.contains("bad_results").await);
    assert_eq!(queue.in_flight_len().await, 1);

    let err = runner
        .process_message(&message(r#"{"debts_id":"bad"}"#))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkerError::Settle(SettleError::SelfTransaction { line: 2, .. })
    ));
}

#[tokio::test]
async fn garbage_body_is_invalid_message() {
    let (_store, _queue, runner) = memory_runner();
    let err = runner.process_message(&message("not json")).await.unwrap_err();
    assert!(matches!(err, WorkerError::InvalidMessage(_)));
}

#[tokio::test]
async fn failed_job_succeeds_on_redelivery() {
    let (store, queue, runner) = memory_runner();
    queue.send(JobMessage::new("late").to_body()).await;
    assert_eq!(runner.run_until_idle().await.unwrap().failed, 1);

    // The ledger shows up, then the visibility window lapses.
    store.put("late", TRIANGLE.as_bytes().to_vec()).await.unwrap();
    assert_eq!(queue.release_in_flight().await, 1);

    let report = runner.run_until_idle().await.unwrap();
    assert_eq!(report.acknowledged, 1);
    assert!(store.contains("late_results").await);
}

#[tokio::test]
async fn processes_batches_larger_than_max_messages() {
    let (store, queue, runner) = memory_runner();
    for i in 0..12 {
        let key = format!("debts-{i}");
        store.put(&key, TRIANGLE.as_bytes().to_vec()).await.unwrap();
        queue.send(JobMessage::new(key).to_body()).await;
    }
    let report = runner.run_until_idle().await.unwrap();
    assert_eq!(report.received, 12);
    assert_eq!(report.acknowledged, 12);
    assert_eq!(store.len().await, 24);
}

#[tokio::test]
async fn empty_ledger_stores_empty_results() {
    let (store, queue, runner) = memory_runner();
    store.put("empty", Vec::new()).await.unwrap();
    queue.send(JobMessage::new("empty").to_body()).await;

    assert_eq!(runner.run_until_idle().await.unwrap().acknowledged, 1);
    assert!(store.get("empty_results").await.unwrap().is_empty());
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let (store, queue, runner) = memory_runner();
    store.put("debts-1", TRIANGLE.as_bytes().to_vec()).await.unwrap();
    queue.send(JobMessage::new("debts-1").to_body()).await;

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { runner.run(rx).await });

    for _ in 0..100 {
        if store.contains("debts-1_results").await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tx.send(true).unwrap();

    let total = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner should stop")
        .unwrap();
    assert_eq!(total.acknowledged, 1);
}

#[tokio::test]
async fn filesystem_backends_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkerConfig {
        store_dir: dir.path().join("debts"),
        queue_dir: dir.path().join("queue"),
        max_messages: 5,
        wait_time_secs: 0,
        ..WorkerConfig::default()
    };

    let store = Arc::new(FsObjectStore::new(&config.store_dir));
    let queue = Arc::new(SpoolQueue::open(&config.queue_dir).await.unwrap());
    store.put("debts-9", TRIANGLE.as_bytes().to_vec()).await.unwrap();
    queue.send(&JobMessage::new("debts-9").to_body()).await.unwrap();

    let runner = JobRunner::from_config(Arc::clone(&store), Arc::clone(&queue), &config);
    let report = runner.run_until_idle().await.unwrap();
    assert_eq!(report.acknowledged, 1);

    let results = std::fs::read_to_string(config.store_dir.join("debts-9_results")).unwrap();
    assert_eq!(results, "Bob,Alice,100\nCharlie,Alice,100\n");
    assert_eq!(std::fs::read_dir(&config.queue_dir).unwrap().count(), 0);
}
