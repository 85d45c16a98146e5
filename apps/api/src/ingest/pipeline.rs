//! Per-upload pipeline orchestration.
//!
//! One run per uploaded document, stages strictly sequential:
//! intake → padding → OCR → structuring → persistence. Concurrent uploads
//! are independent runs. The document bytes stay in memory end-to-end
//! (the intake ceiling bounds them), so a run leaves no scratch state
//! behind on any exit path.
//!
//! Failure routing per stage: intake rejects before any side effect,
//! padding fails closed, extraction and structuring degrade and continue,
//! persistence aborts after compensating cleanup. Whenever a run aborts,
//! the document row is marked `failed` best-effort before the error
//! propagates.

use anyhow::anyhow;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::documents::{advance_status, create_document, mark_failed, set_stored};
use crate::ingest::extract::extract_text;
use crate::ingest::intake::validate_upload;
use crate::ingest::padding::{pad_pdf, DEFAULT_MARGIN};
use crate::ingest::structure::structure_resume;
use crate::models::document::DocumentStatus;
use crate::models::resume::ResumeRow;
use crate::resumes::storage::{persist_resume, PersistRequest};
use crate::state::AppState;

/// One incoming upload, as received by the HTTP handler.
#[derive(Debug)]
pub struct UploadRequest {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
    pub user_id: Option<Uuid>,
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub document_id: Uuid,
    pub resume: ResumeRow,
}

pub async fn run_pipeline(
    state: &AppState,
    request: UploadRequest,
) -> Result<PipelineOutcome, AppError> {
    // Stage 1: intake. Fail fast — nothing has been written yet.
    let validated = validate_upload(request.filename.as_deref(), request.bytes.len())?;

    let document = create_document(
        &state.db,
        &validated.filename,
        &request.content_type,
        request.bytes.len() as i64,
    )
    .await?;
    let document_id = document.id;
    info!(
        document_id = %document_id,
        "Accepted upload '{}' ({} bytes)",
        validated.filename,
        request.bytes.len()
    );

    // Stage 2: page padding. PDF-only and fail-closed: an unreadable
    // document aborts the run. Other accepted formats are submitted to
    // the OCR collaborator unmodified.
    advance_status(&state.db, document_id, DocumentStatus::Extracting).await?;
    let ocr_input = if validated.is_pdf() {
        match pad_pdf(&request.bytes, DEFAULT_MARGIN, DEFAULT_MARGIN) {
            Ok(padded) => padded,
            Err(e) => {
                mark_failed(&state.db, document_id).await;
                return Err(AppError::Stage {
                    document_id,
                    message: format!("Page padding failed: {e}"),
                });
            }
        }
    } else {
        request.bytes.to_vec()
    };

    // Stage 3: OCR. Degrades to empty text on collaborator failure.
    let extracted = extract_text(&state.ocr, document_id, &ocr_input, &request.content_type).await;
    info!(
        document_id = %extracted.document_id,
        "Extracted {} characters via {}",
        extracted.char_count(),
        extracted.method
    );

    // Stage 4: structuring. Degrades to the canonical empty resume.
    advance_status(&state.db, document_id, DocumentStatus::Structuring).await?;
    let structured = structure_resume(&state.llm, &extracted.text).await;
    let structured_data = serde_json::to_value(&structured)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize structured resume: {e}")))?;

    // Stage 5: persistence. Blob first; the metadata insert failing
    // triggers a compensating blob delete inside persist_resume.
    let persisted = persist_resume(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        PersistRequest {
            document_id,
            user_id: request.user_id,
            filename: &validated.filename,
            extension: &validated.extension,
            content_type: &request.content_type,
            bytes: &request.bytes,
            structured_data,
            raw_text: &extracted.text,
            extraction_method: extracted.method,
        },
    )
    .await;

    let resume = match persisted {
        Ok(resume) => resume,
        Err(e) => {
            mark_failed(&state.db, document_id).await;
            return Err(e);
        }
    };

    set_stored(&state.db, document_id, &resume.storage_path).await?;
    info!(document_id = %document_id, resume_id = %resume.id, "Pipeline run completed");

    Ok(PipelineOutcome {
        document_id,
        resume,
    })
}
