pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest;
use crate::ingest::intake::MAX_UPLOAD_BYTES;
use crate::resumes;
use crate::state::AppState;

/// Request-body ceiling: the intake file-size limit plus multipart framing
/// overhead. Intake still enforces the exact per-file ceiling.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion pipeline
        .route(
            "/api/v1/resumes/upload",
            post(ingest::handlers::handle_upload),
        )
        .route(
            "/api/v1/documents/:id",
            get(ingest::handlers::handle_get_document),
        )
        // Resume management
        .route("/api/v1/resumes", get(resumes::handlers::handle_list_resumes))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handlers::handle_get_resume)
                .put(resumes::handlers::handle_update_resume)
                .delete(resumes::handlers::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/structured-data",
            get(resumes::handlers::handle_get_structured_data),
        )
        .route(
            "/api/v1/resumes/:id/raw-text",
            get(resumes::handlers::handle_get_raw_text),
        )
        .route(
            "/api/v1/resumes/:id/download",
            get(resumes::handlers::handle_download_resume),
        )
        .route(
            "/api/v1/storage/stats",
            get(resumes::handlers::handle_storage_stats),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}
