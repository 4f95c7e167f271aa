use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::job::{JobState, StoredJob};
use crate::models::ocr::{StatusResponse, SubmitResponse};
use crate::services::queue::QueuedDocument;

/// POST /api/v1/ocr/process — Submit a document for asynchronous extraction.
pub async fn submit_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), StatusCode> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let media_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            upload = Some((data.to_vec(), media_type));
        }
    }

    let (document, media_type) = upload.ok_or(StatusCode::BAD_REQUEST)?;

    // Fail fast on empty uploads; nothing reaches the queue.
    if document.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let job = QueuedDocument {
        job_id: Uuid::new_v4(),
        document,
        media_type,
    };

    state.queue.enqueue(&job).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to enqueue OCR job");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // The job is durably queued at this point, so the submission succeeds even
    // if the pending marker cannot be written; a worker will produce the
    // terminal record either way. NX keeps any state a faster worker wrote.
    if let Err(e) = state.results.init_pending(job.job_id).await {
        tracing::warn!(job_id = %job.job_id, error = %e, "Failed to write pending record");
    }

    metrics::counter!("ocr_jobs_submitted_total").increment(1);

    tracing::info!(
        job_id = %job.job_id,
        media_type = %job.media_type,
        bytes = job.document.len(),
        "OCR job queued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id: job.job_id,
            state: JobState::Pending,
            message: "Document queued for OCR processing".to_string(),
        }),
    ))
}

/// GET /api/v1/ocr/results/{job_id} — Job state merged with current queue depth.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, StatusCode> {
    // The two sub-reads are independent; issue them concurrently.
    let (record, depth) = tokio::join!(state.results.fetch(job_id), state.queue.depth());

    let record = record.map_err(|e| {
        tracing::error!(job_id = %job_id, error = %e, "Result store read failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let pending_tasks = match depth {
        Ok(depth) => {
            metrics::gauge!("ocr_queue_depth").set(depth as f64);
            Some(depth)
        }
        Err(e) => {
            // Depth is best-effort; a broker hiccup must not fail the query.
            tracing::warn!(error = %e, "Queue depth read failed");
            None
        }
    };

    merge_status(job_id, record, pending_tasks)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Merge the two independent sub-reads into one status response.
///
/// `None` means the job has no record at all (never submitted, or expired),
/// which callers report as not-found rather than Pending.
fn merge_status(
    job_id: Uuid,
    record: Option<StoredJob>,
    pending_tasks: Option<u64>,
) -> Option<StatusResponse> {
    record.map(|record| StatusResponse {
        job_id,
        state: record.state,
        result: record.result,
        pending_tasks,
    })
}
