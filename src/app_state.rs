use std::sync::Arc;

use crate::services::{engine::ExtractionClient, queue::JobQueue, results::ResultStore};

/// Shared application state passed to all route handlers and workers.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<JobQueue>,
    pub results: Arc<ResultStore>,
    pub engine: Arc<ExtractionClient>,
}

impl AppState {
    pub fn new(queue: JobQueue, results: ResultStore, engine: ExtractionClient) -> Self {
        Self {
            queue: Arc::new(queue),
            results: Arc::new(results),
            engine: Arc::new(engine),
        }
    }
}
