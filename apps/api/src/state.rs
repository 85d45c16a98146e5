use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::ocr_client::OcrClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. Collaborator clients are built once at startup and cloned
/// into handlers, never recreated per request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub ocr: OcrClient,
    pub llm: LlmClient,
    pub config: Config,
}
