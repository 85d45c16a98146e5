use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::storage::{
    count_resumes, delete_resume, download_url, get_resume, list_resumes, status_breakdown,
    total_file_size, update_resume, ResumeUpdate,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

fn default_limit() -> i64 {
    10
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRow>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    if !(1..=100).contains(&params.limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 100".to_string(),
        ));
    }
    if params.offset < 0 {
        return Err(AppError::Validation("offset must be >= 0".to_string()));
    }

    let resumes = list_resumes(&state.db, params.user_id, params.limit, params.offset).await?;
    let total_count = count_resumes(&state.db, params.user_id).await?;

    Ok(Json(ResumeListResponse {
        has_more: params.offset + params.limit < total_count,
        resumes,
        total_count,
        limit: params.limit,
        offset: params.offset,
    }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Value>, AppError> {
    let resume = require_resume(&state, id, params.user_id).await?;
    Ok(Json(json!({ "resume": resume })))
}

/// GET /api/v1/resumes/:id/structured-data
pub async fn handle_get_structured_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Value>, AppError> {
    let resume = require_resume(&state, id, params.user_id).await?;
    Ok(Json(json!({
        "resume_id": resume.id,
        "structured_data": resume.structured_data,
        "cv_name": resume.cv_name,
        "status": resume.status,
        "created_at": resume.created_at,
        "updated_at": resume.updated_at,
    })))
}

/// GET /api/v1/resumes/:id/raw-text
pub async fn handle_get_raw_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Value>, AppError> {
    let resume = require_resume(&state, id, params.user_id).await?;
    Ok(Json(json!({
        "resume_id": resume.id,
        "raw_text": resume.raw_text,
        "raw_text_length": resume.raw_text.chars().count(),
        "cv_name": resume.cv_name,
        "status": resume.status,
        "created_at": resume.created_at,
        "updated_at": resume.updated_at,
    })))
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub user_id: Uuid,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// GET /api/v1/resumes/:id/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DownloadQuery>,
) -> Result<Json<Value>, AppError> {
    // 5 minutes to 24 hours
    if !(300..=86_400).contains(&params.expires_in) {
        return Err(AppError::Validation(
            "expires_in must be between 300 and 86400 seconds".to_string(),
        ));
    }

    let resume = require_resume(&state, id, params.user_id).await?;
    let url = download_url(
        &state.s3,
        &state.config.s3_bucket,
        &resume.storage_path,
        params.expires_in,
    )
    .await?;

    Ok(Json(json!({
        "download_url": url,
        "expires_in": params.expires_in,
        "message": "Download URL generated successfully",
    })))
}

#[derive(Deserialize)]
pub struct ResumeUpdateRequest {
    pub structured_data: Option<Value>,
    pub raw_text: Option<String>,
    pub status: Option<String>,
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(body): Json<ResumeUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = update_resume(
        &state.db,
        id,
        params.user_id,
        ResumeUpdate {
            structured_data: body.structured_data,
            raw_text: body.raw_text,
            status: body.status,
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    Ok(Json(json!({
        "message": "Resume updated successfully",
        "resume": updated,
    })))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Value>, AppError> {
    let deleted = delete_resume(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        id,
        params.user_id,
    )
    .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }

    Ok(Json(json!({
        "message": "Resume deleted successfully",
        "resume_id": id,
    })))
}

#[derive(Serialize)]
pub struct StorageStatsResponse {
    pub user_id: Uuid,
    pub total_files: i64,
    pub total_size_bytes: i64,
    pub total_size_mb: f64,
    pub total_size_gb: f64,
    pub status_breakdown: Value,
    pub average_file_size_mb: f64,
}

/// GET /api/v1/storage/stats
pub async fn handle_storage_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<StorageStatsResponse>, AppError> {
    let total_files = count_resumes(&state.db, params.user_id).await?;
    let total_size_bytes = total_file_size(&state.db, params.user_id).await?;
    let breakdown = status_breakdown(&state.db, params.user_id).await?;

    let size_mb = total_size_bytes as f64 / (1024.0 * 1024.0);
    let size_gb = size_mb / 1024.0;
    let average_mb = if total_files > 0 {
        size_mb / total_files as f64
    } else {
        0.0
    };

    let breakdown_obj: serde_json::Map<String, Value> = breakdown
        .into_iter()
        .map(|(status, count)| (status, json!(count)))
        .collect();

    Ok(Json(StorageStatsResponse {
        user_id: params.user_id,
        total_files,
        total_size_bytes,
        total_size_mb: round2(size_mb),
        total_size_gb: round4(size_gb),
        status_breakdown: Value::Object(breakdown_obj),
        average_file_size_mb: round2(average_mb),
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

async fn require_resume(state: &AppState, id: Uuid, user_id: Uuid) -> Result<ResumeRow, AppError> {
    get_resume(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round2(1.2345), 1.23);
        assert_eq!(round2(5.678), 5.68);
        assert_eq!(round4(0.00012345), 0.0001);
    }

    #[test]
    fn test_list_query_defaults() {
        let params: ListQuery =
            serde_json::from_str(&format!(r#"{{"user_id": "{}"}}"#, Uuid::new_v4())).unwrap();
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn test_download_query_default_expiry() {
        let params: DownloadQuery =
            serde_json::from_str(&format!(r#"{{"user_id": "{}"}}"#, Uuid::new_v4())).unwrap();
        assert_eq!(params.expires_in, 3600);
    }
}
