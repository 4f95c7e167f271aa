use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ocr_pipeline::app_state::AppState;
use ocr_pipeline::config::AppConfig;
use ocr_pipeline::routes;
use ocr_pipeline::services::{engine::ExtractionClient, queue::JobQueue, results::ResultStore};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing ocr-pipeline server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("ocr_jobs_submitted_total", "Total OCR jobs submitted");
    metrics::describe_counter!(
        "ocr_jobs_completed_total",
        "Total OCR jobs completed successfully"
    );
    metrics::describe_counter!("ocr_jobs_failed_total", "Total OCR jobs that failed");
    metrics::describe_histogram!(
        "ocr_processing_seconds",
        "Time spent extracting one document"
    );
    metrics::describe_gauge!(
        "ocr_queue_depth",
        "Current number of pending jobs in the queue"
    );

    // Initialize Redis job queue
    tracing::info!("Connecting to Redis job queue");
    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize job queue");

    // Initialize Redis result store
    tracing::info!("Connecting to Redis result store");
    let results = ResultStore::new(&config.redis_url, config.result_ttl_secs)
        .expect("Failed to initialize result store");

    // Initialize extraction engine client
    tracing::info!("Initializing extraction engine client");
    let engine = ExtractionClient::new(&config.engine_url)
        .expect("Failed to initialize extraction engine client");

    // Create shared application state
    let state = AppState::new(queue, results, engine);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/ocr/process", post(routes::ocr::submit_document))
        .route(
            "/api/v1/ocr/results/{job_id}",
            get(routes::ocr::get_job_status),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes));

    tracing::info!("Starting ocr-pipeline on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
