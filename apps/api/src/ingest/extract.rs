//! Text extraction stage.
//!
//! Delegates to the OCR collaborator and absorbs its failures: an error or
//! an empty response yields empty text and the pipeline proceeds to
//! structuring. This is deliberately the opposite of the padding stage's
//! fail-closed policy — a degraded structuring attempt beats aborting the
//! whole upload.

use tracing::warn;
use uuid::Uuid;

use crate::ocr_client::{join_pages, OcrClient};

/// Tag recorded on records produced by this extraction path.
pub const EXTRACTION_METHOD: &str = "mistral-ocr-padded";

/// Plain-text OCR result for one document. Immutable once produced; empty
/// text is a valid degraded state, not an error.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub document_id: Uuid,
    pub text: String,
    pub method: &'static str,
}

impl ExtractedText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub async fn extract_text(
    ocr: &OcrClient,
    document_id: Uuid,
    document: &[u8],
    content_type: &str,
) -> ExtractedText {
    let text = match ocr.process(document, content_type).await {
        Ok(pages) => join_pages(pages),
        Err(e) => {
            warn!(document_id = %document_id, "OCR extraction failed, continuing with empty text: {e}");
            String::new()
        }
    };

    if text.is_empty() {
        warn!(document_id = %document_id, "OCR produced no text for this document");
    }

    ExtractedText {
        document_id,
        text,
        method: EXTRACTION_METHOD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_counts_characters_not_bytes() {
        let extracted = ExtractedText {
            document_id: Uuid::new_v4(),
            text: "Élève ingénieur".to_string(),
            method: EXTRACTION_METHOD,
        };
        assert_eq!(extracted.char_count(), 15);
        assert!(extracted.text.len() > 15);
    }

    #[test]
    fn test_empty_text_is_a_valid_state() {
        let extracted = ExtractedText {
            document_id: Uuid::new_v4(),
            text: String::new(),
            method: EXTRACTION_METHOD,
        };
        assert_eq!(extracted.char_count(), 0);
    }
}
