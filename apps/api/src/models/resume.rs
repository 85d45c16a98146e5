use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted resume: document metadata, structured data, blob pointer and
/// (optional) owner. `user_id` is NULL for anonymous uploads, which are not
/// reachable through the owner-scoped CRUD surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Option<Uuid>,
    pub cv_name: String,
    pub original_filename: String,
    pub content_type: String,
    pub storage_path: String,
    pub file_size: i64,
    pub structured_data: Value,
    pub raw_text: String,
    pub extraction_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
