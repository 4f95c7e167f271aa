use serde::{Deserialize, Serialize};

/// Lifecycle state of an OCR job in the async queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Started,
    Success,
    Failure,
}

impl JobState {
    /// Terminal states never change again; `mark_started` must not overwrite them.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

/// Result Store record for one job, keyed by job id.
///
/// `result` is present only for terminal states: `{"detections": [...]}` on
/// success, `{"error": "..."}` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredJob {
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}
