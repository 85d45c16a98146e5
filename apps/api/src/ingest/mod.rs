//! Document-ingestion pipeline: intake, PDF padding, OCR extraction,
//! LLM structuring and the per-upload orchestration.

pub mod documents;
pub mod extract;
pub mod handlers;
pub mod intake;
pub mod padding;
pub mod pipeline;
pub mod prompts;
pub mod structure;
