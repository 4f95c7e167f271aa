use ocr_pipeline::{
    app_state::AppState,
    config::AppConfig,
    models::job::JobState,
    services::{engine::ExtractionClient, queue::JobQueue, results::ResultStore},
};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const ERROR_BACKOFF_MS: u64 = 1000;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting OCR worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize services
    tracing::info!("Initializing services");
    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize job queue");

    let results = ResultStore::new(&config.redis_url, config.result_ttl_secs)
        .expect("Failed to initialize result store");

    let engine = ExtractionClient::new(&config.engine_url)
        .expect("Failed to initialize extraction engine client");

    let state = AppState::new(queue, results, engine);

    tracing::info!("Worker ready, starting job processing loop");

    // Main processing loop
    loop {
        match process_next_job(&state).await {
            Ok(true) => {
                // Job processed, continue immediately
                tracing::debug!("Job processed, checking for next job");
            }
            Ok(false) => {
                // Dequeue already blocked for its timeout window; poll again
                tracing::trace!("No jobs available");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error processing job, backing off");
                sleep(Duration::from_millis(ERROR_BACKOFF_MS)).await;
            }
        }
    }
}

/// Process the next job from the queue.
/// Returns Ok(true) if a job was processed, Ok(false) if the queue stayed empty.
async fn process_next_job(state: &AppState) -> Result<bool, Box<dyn std::error::Error>> {
    // Dequeue next job
    let job = match state.queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        job_id = %job.job_id,
        media_type = %job.media_type,
        bytes = job.document.len(),
        "Processing OCR job"
    );

    // Claim the job in the result store
    match state.results.mark_started(job.job_id).await {
        Ok(true) => {}
        Ok(false) => {
            // Redelivered payload for a job that already reached a terminal
            // state; acknowledge and move on without re-running extraction.
            tracing::warn!(job_id = %job.job_id, "Job already terminal, skipping redelivery");
            state.queue.complete(&job).await?;
            return Ok(true);
        }
        Err(e) => {
            tracing::error!(job_id = %job.job_id, error = %e, "Failed to mark job started");
            return Err(e.into());
        }
    }

    // Invoke the extraction engine; its failures become terminal job data and
    // must never take down the loop.
    let start = std::time::Instant::now();
    let outcome = state.engine.extract(&job.document, &job.media_type).await;
    let elapsed = start.elapsed();
    metrics::histogram!("ocr_processing_seconds").record(elapsed.as_secs_f64());

    match outcome {
        Ok(detections) => {
            tracing::info!(
                job_id = %job.job_id,
                detections = detections.len(),
                duration_ms = elapsed.as_millis() as u64,
                "Extraction complete"
            );

            let result = serde_json::json!({ "detections": detections });
            state
                .results
                .finish(job.job_id, JobState::Success, result)
                .await?;
            metrics::counter!("ocr_jobs_completed_total").increment(1);
        }
        Err(e) => {
            tracing::error!(job_id = %job.job_id, error = %e, "Extraction failed");

            let result = serde_json::json!({ "error": e.to_string() });
            state
                .results
                .finish(job.job_id, JobState::Failure, result)
                .await?;
            metrics::counter!("ocr_jobs_failed_total").increment(1);
        }
    }

    // Acknowledge only after the terminal record is written
    state.queue.complete(&job).await?;

    Ok(true)
}
