use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::documents::get_document;
use crate::ingest::pipeline::{run_pipeline, UploadRequest};
use crate::models::document::DocumentRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UploadQuery {
    /// Verified owner identity, supplied by the auth collaborator upstream.
    /// Absent for anonymous uploads.
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document_id: Uuid,
    pub resume_id: Uuid,
    pub filename: String,
    pub raw_text_length: usize,
    pub structured_data: Value,
    pub status: String,
}

/// POST /api/v1/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(Option<String>, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            file = Some((filename, content_type, bytes));
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(AppError::Validation(
            "Multipart field 'file' is required".to_string(),
        ));
    };

    let outcome = run_pipeline(
        &state,
        UploadRequest {
            filename,
            content_type,
            bytes,
            user_id: params.user_id,
        },
    )
    .await?;

    let resume = outcome.resume;
    Ok(Json(UploadResponse {
        message: "Resume uploaded and processed successfully".to_string(),
        document_id: outcome.document_id,
        resume_id: resume.id,
        filename: resume.original_filename,
        raw_text_length: resume.raw_text.chars().count(),
        structured_data: resume.structured_data,
        status: resume.status,
    }))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentRow>, AppError> {
    let document = get_document(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    Ok(Json(document))
}
