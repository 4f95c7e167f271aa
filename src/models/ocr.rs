use serde::Serialize;
use uuid::Uuid;

use crate::models::job::JobState;

/// Response after submitting a document for OCR processing.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub state: JobState,
    pub message: String,
}

/// Response for querying job status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub state: JobState,

    /// Present only for terminal jobs: `{"detections": [...]}` or `{"error": "..."}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Current depth of the default queue; `null` when the broker read failed.
    pub pending_tasks: Option<u64>,
}
