//! Resume persistence: blob storage plus the metadata row, and the
//! owner-scoped queries for everything after ingestion.
//!
//! Two writes make one logical persist. The blob goes first; if the row
//! insert then fails, the blob is deleted so no orphan outlives the
//! failure. Ownership scoping is uniform: every read/update/delete
//! filters by record id AND owner id, so a foreign record answers exactly
//! like a missing one.

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;

pub struct PersistRequest<'a> {
    pub document_id: Uuid,
    pub user_id: Option<Uuid>,
    pub filename: &'a str,
    pub extension: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
    pub structured_data: Value,
    pub raw_text: &'a str,
    pub extraction_method: &'a str,
}

/// Blob key for a resume: owner segment + generated filename. Re-uploads
/// of identical content get a fresh id and a fresh key — no dedup.
pub fn storage_key(user_id: Option<Uuid>, resume_id: Uuid, extension: &str) -> String {
    let owner = user_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    format!("resumes/{owner}/resume_{resume_id}.{extension}")
}

/// Display name for a resume: the original filename without its extension.
pub fn cv_name(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
}

/// Persists the original document and its metadata row as one logical
/// unit. On insert failure the just-written blob is deleted; if that
/// compensating delete fails too it is logged and the persist error is
/// still raised.
pub async fn persist_resume(
    pool: &PgPool,
    s3: &S3Client,
    s3_bucket: &str,
    request: PersistRequest<'_>,
) -> Result<ResumeRow, AppError> {
    let resume_id = Uuid::new_v4();
    let key = storage_key(request.user_id, resume_id, request.extension);

    s3.put_object()
        .bucket(s3_bucket)
        .key(&key)
        .body(ByteStream::from(request.bytes.to_vec()))
        .content_type(request.content_type)
        .send()
        .await
        .map_err(|e| AppError::Persist {
            document_id: request.document_id,
            message: format!("Blob upload failed: {e}"),
        })?;
    info!("Uploaded resume blob to s3://{}/{}", s3_bucket, key);

    let inserted = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, document_id, user_id, cv_name, original_filename, content_type,
             storage_path, file_size, structured_data, raw_text, extraction_method, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'stored')
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(request.document_id)
    .bind(request.user_id)
    .bind(cv_name(request.filename))
    .bind(request.filename)
    .bind(request.content_type)
    .bind(&key)
    .bind(request.bytes.len() as i64)
    .bind(&request.structured_data)
    .bind(request.raw_text)
    .bind(request.extraction_method)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(row) => {
            info!(resume_id = %row.id, "Resume record persisted");
            Ok(row)
        }
        Err(e) => {
            // Compensating delete: the blob must not outlive the failed insert.
            if let Err(cleanup) = s3.delete_object().bucket(s3_bucket).key(&key).send().await {
                error!("Failed to delete orphan blob {key}: {cleanup}");
            }
            Err(AppError::Persist {
                document_id: request.document_id,
                message: format!("Metadata insert failed: {e}"),
            })
        }
    }
}

pub async fn get_resume(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, AppError> {
    let row =
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn list_resumes(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<ResumeRow>, AppError> {
    let rows = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_resumes(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Fields a caller may change after ingestion. `None` leaves the column
/// untouched; last write wins on concurrent updates.
#[derive(Debug, Default)]
pub struct ResumeUpdate {
    pub structured_data: Option<Value>,
    pub raw_text: Option<String>,
    pub status: Option<String>,
}

pub async fn update_resume(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    update: ResumeUpdate,
) -> Result<Option<ResumeRow>, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes
        SET structured_data = COALESCE($3, structured_data),
            raw_text = COALESCE($4, raw_text),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(update.structured_data)
    .bind(update.raw_text)
    .bind(update.status)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Deletes blob and row. The blob delete is best-effort: storage failure
/// is logged and the row delete still proceeds. Returns false when the
/// record does not exist for this owner.
pub async fn delete_resume(
    pool: &PgPool,
    s3: &S3Client,
    s3_bucket: &str,
    id: Uuid,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let Some(resume) = get_resume(pool, id, user_id).await? else {
        return Ok(false);
    };

    if let Err(e) = s3
        .delete_object()
        .bucket(s3_bucket)
        .key(&resume.storage_path)
        .send()
        .await
    {
        warn!(
            "Failed to delete blob {} for resume {id}: {e}",
            resume.storage_path
        );
    }

    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Presigned GET URL for the stored blob.
pub async fn download_url(
    s3: &S3Client,
    s3_bucket: &str,
    storage_path: &str,
    expires_in_secs: u64,
) -> Result<String, AppError> {
    let config = PresigningConfig::expires_in(std::time::Duration::from_secs(expires_in_secs))
        .map_err(|e| AppError::S3(format!("Invalid presign expiry: {e}")))?;

    let presigned = s3
        .get_object()
        .bucket(s3_bucket)
        .key(storage_path)
        .presigned(config)
        .await
        .map_err(|e| AppError::S3(format!("Failed to presign download URL: {e}")))?;

    Ok(presigned.uri().to_string())
}

/// Per-status record counts for one owner.
pub async fn status_breakdown(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<(String, i64)>, AppError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM resumes WHERE user_id = $1 GROUP BY status",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn total_file_size(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let total: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(file_size), 0) FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_includes_owner_segment() {
        let user = Uuid::new_v4();
        let resume = Uuid::new_v4();
        let key = storage_key(Some(user), resume, "pdf");
        assert_eq!(key, format!("resumes/{user}/resume_{resume}.pdf"));
    }

    #[test]
    fn test_storage_key_for_anonymous_upload() {
        let resume = Uuid::new_v4();
        let key = storage_key(None, resume, "docx");
        assert_eq!(key, format!("resumes/anonymous/resume_{resume}.docx"));
    }

    #[test]
    fn test_storage_keys_are_unique_per_record() {
        let user = Uuid::new_v4();
        assert_ne!(
            storage_key(Some(user), Uuid::new_v4(), "pdf"),
            storage_key(Some(user), Uuid::new_v4(), "pdf")
        );
    }

    #[test]
    fn test_cv_name_strips_extension() {
        assert_eq!(cv_name("CV_Jane_Doe.pdf"), "CV_Jane_Doe");
        assert_eq!(cv_name("archive.2024.pdf"), "archive.2024");
    }

    #[test]
    fn test_cv_name_without_extension_is_unchanged() {
        assert_eq!(cv_name("resume"), "resume");
        // A leading dot is a hidden file, not an extension separator.
        assert_eq!(cv_name(".profile"), ".profile");
    }
}
