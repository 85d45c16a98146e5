//! `documents` table access — the per-upload status record.
//!
//! A document row is created at intake and advanced by exactly one
//! pipeline run. The transition guard enforces the forward-only status
//! order; `Failed` is reachable from any non-terminal state.

use anyhow::anyhow;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentRow, DocumentStatus};

/// Inserts a fresh `received` row and returns it.
pub async fn create_document(
    pool: &PgPool,
    original_filename: &str,
    content_type: &str,
    size_bytes: i64,
) -> Result<DocumentRow, AppError> {
    let row = sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO documents (id, original_filename, content_type, size_bytes, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(original_filename)
    .bind(content_type)
    .bind(size_bytes)
    .bind(DocumentStatus::Received.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_document(pool: &PgPool, id: Uuid) -> Result<Option<DocumentRow>, AppError> {
    let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Advances the document to `next`, enforcing the forward-only order.
pub async fn advance_status(
    pool: &PgPool,
    id: Uuid,
    next: DocumentStatus,
) -> Result<(), AppError> {
    let stored: Option<String> = sqlx::query_scalar("SELECT status FROM documents WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let stored = stored.ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    let current = DocumentStatus::parse(&stored)
        .ok_or_else(|| AppError::Internal(anyhow!("Document {id} has unknown status '{stored}'")))?;

    if !current.can_transition_to(next) {
        return Err(AppError::Internal(anyhow!(
            "Illegal status transition {} -> {} for document {id}",
            current.as_str(),
            next.as_str()
        )));
    }

    sqlx::query("UPDATE documents SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(next.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Records the terminal `stored` state together with the blob pointer.
pub async fn set_stored(pool: &PgPool, id: Uuid, storage_path: &str) -> Result<(), AppError> {
    advance_status(pool, id, DocumentStatus::Stored).await?;
    sqlx::query("UPDATE documents SET storage_path = $1, updated_at = NOW() WHERE id = $2")
        .bind(storage_path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Best-effort terminal `failed` marker, used while an error is already
/// propagating. Never masks the original error.
pub async fn mark_failed(pool: &PgPool, id: Uuid) {
    let result = sqlx::query(
        "UPDATE documents SET status = 'failed', updated_at = NOW() \
         WHERE id = $1 AND status NOT IN ('stored', 'failed')",
    )
    .bind(id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!(document_id = %id, "Could not record failed status: {e}");
    }
}
