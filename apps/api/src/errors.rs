use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Collaborator failures inside the pipeline are NOT represented here: the
/// extraction and structuring stages absorb them and substitute empty
/// defaults. Only fail-fast (validation), fail-closed (pre-processing) and
/// persistence failures reach the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The document could not be pre-processed (e.g. unparsable PDF).
    /// Carries the document id so the caller can correlate server logs.
    #[error("Stage failure for document {document_id}: {message}")]
    Stage { document_id: Uuid, message: String },

    /// Blob or metadata write failed after intake. The orphan blob has
    /// already been cleaned up by the time this error is raised.
    #[error("Persistence failure for document {document_id}: {message}")]
    Persist { document_id: Uuid, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, correlation_id) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Stage {
                document_id,
                message,
            } => {
                tracing::error!(document_id = %document_id, "Stage error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DOCUMENT_PROCESSING_ERROR",
                    "The document could not be processed".to_string(),
                    Some(*document_id),
                )
            }
            AppError::Persist {
                document_id,
                message,
            } => {
                tracing::error!(document_id = %document_id, "Persist error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The document could not be stored".to_string(),
                    Some(*document_id),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let body = match correlation_id {
            Some(id) => Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "correlation_id": id
                }
            })),
            None => Json(json!({
                "error": {
                    "code": code,
                    "message": message
                }
            })),
        };

        (status, body).into_response()
    }
}
