use ocr_pipeline::{
    models::job::JobState,
    services::{
        queue::{JobQueue, QueuedDocument},
        results::ResultStore,
    },
};
use uuid::Uuid;

/// Redis URL for tests; point this at a dedicated test instance.
fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string())
}

fn sample_job() -> QueuedDocument {
    QueuedDocument {
        job_id: Uuid::new_v4(),
        document: b"fake document bytes for testing".to_vec(),
        media_type: "image/png".to_string(),
    }
}

/// Integration test: broker queue round trip with acknowledgement.
///
/// Note: this requires a running Redis instance configured via REDIS_URL.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_queue_enqueue_dequeue_ack() {
    let queue = JobQueue::new(&redis_url()).expect("Failed to initialize queue");

    let job = sample_job();
    queue.enqueue(&job).await.expect("Failed to enqueue");

    let depth = queue.depth().await.expect("Failed to read depth");
    assert!(depth >= 1, "enqueued job should be counted in depth");

    let dequeued = queue
        .dequeue()
        .await
        .expect("Failed to dequeue")
        .expect("No job in queue");

    assert_eq!(dequeued.job_id, job.job_id);
    assert_eq!(dequeued.document, job.document);
    assert_eq!(dequeued.media_type, job.media_type);

    queue.complete(&dequeued).await.expect("Failed to ack job");
}

/// Integration test: full result store lifecycle with the monotonicity guard.
#[tokio::test]
#[ignore]
async fn test_result_store_lifecycle_is_monotonic() {
    let store = ResultStore::new(&redis_url(), 3600).expect("Failed to initialize store");
    let job_id = Uuid::new_v4();

    // Unknown job reads as absent, not pending
    assert!(store.fetch(job_id).await.expect("fetch failed").is_none());

    store.init_pending(job_id).await.expect("init failed");
    let record = store.fetch(job_id).await.unwrap().expect("record missing");
    assert_eq!(record.state, JobState::Pending);
    assert!(record.result.is_none());

    let claimed = store.mark_started(job_id).await.expect("start failed");
    assert!(claimed);
    let record = store.fetch(job_id).await.unwrap().expect("record missing");
    assert_eq!(record.state, JobState::Started);

    let result = serde_json::json!({ "detections": [] });
    store
        .finish(job_id, JobState::Success, result.clone())
        .await
        .expect("finish failed");

    // A stale redelivery must not regress the terminal state
    let claimed_again = store.mark_started(job_id).await.expect("start failed");
    assert!(!claimed_again, "terminal record must reject a Started write");

    let record = store.fetch(job_id).await.unwrap().expect("record missing");
    assert_eq!(record.state, JobState::Success);
    assert_eq!(record.result, Some(result.clone()));

    // Idempotent read: same content on repeated fetches
    let again = store.fetch(job_id).await.unwrap().expect("record missing");
    assert_eq!(again.state, JobState::Success);
    assert_eq!(again.result, Some(result));
}

/// Integration test: init_pending never overwrites worker progress.
#[tokio::test]
#[ignore]
async fn test_init_pending_keeps_existing_state() {
    let store = ResultStore::new(&redis_url(), 3600).expect("Failed to initialize store");
    let job_id = Uuid::new_v4();

    // Worker won the race and already claimed the job
    store.init_pending(job_id).await.expect("init failed");
    assert!(store.mark_started(job_id).await.expect("start failed"));

    // Late pending write from the submission path is a no-op
    store.init_pending(job_id).await.expect("init failed");

    let record = store.fetch(job_id).await.unwrap().expect("record missing");
    assert_eq!(record.state, JobState::Started);
}

/// Integration test: records expire after the retention window.
#[tokio::test]
#[ignore]
async fn test_result_store_expiry() {
    let store = ResultStore::new(&redis_url(), 1).expect("Failed to initialize store");
    let job_id = Uuid::new_v4();

    store
        .finish(job_id, JobState::Success, serde_json::json!({ "detections": [] }))
        .await
        .expect("finish failed");

    assert!(store.fetch(job_id).await.expect("fetch failed").is_some());

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    // Expired record is indistinguishable from one that never existed
    assert!(store.fetch(job_id).await.expect("fetch failed").is_none());
}

/// Integration test: concurrent enqueues all land on the queue.
#[tokio::test]
#[ignore]
async fn test_concurrent_enqueues() {
    let queue = JobQueue::new(&redis_url()).expect("Failed to initialize queue");

    let jobs: Vec<QueuedDocument> = (0..8).map(|_| sample_job()).collect();

    let results =
        futures::future::join_all(jobs.iter().map(|job| queue.enqueue(job))).await;
    for result in results {
        result.expect("Failed to enqueue");
    }

    let depth = queue.depth().await.expect("Failed to read depth");
    assert!(depth >= 8);

    // Drain what we pushed so later tests see a quieter queue
    let mut drained = 0;
    while drained < 8 {
        match queue.dequeue().await.expect("Failed to dequeue") {
            Some(job) => {
                queue.complete(&job).await.expect("Failed to ack");
                drained += 1;
            }
            None => break,
        }
    }
}
