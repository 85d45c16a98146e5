/// OCR Client — the single point of entry for document-OCR calls.
///
/// The document travels to the provider as embedded data (a base64
/// `data:` URL), never as a multipart upload, so no provider-side file
/// handle is left behind to clean up. The provider answers with a job
/// envelope; non-terminal statuses are polled on a fixed interval with a
/// bounded poll budget. Exhausting the budget is a local terminal state
/// (`TimedOut`), not an unbounded wait.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OCR_API_URL: &str = "https://api.mistral.ai/v1/ocr";
/// The model used for all OCR calls.
pub const OCR_MODEL: &str = "mistral-ocr-latest";
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(2);
/// Upper bound on status polls per call (2 minutes at the fixed interval).
const MAX_POLLS: u32 = 60;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("OCR job ended in status {status}")]
    JobFailed { status: &'static str },

    #[error("OCR job still pending after {polls} polls")]
    TimedOut { polls: u32 },
}

/// Provider-side lifecycle of an OCR job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrJobStatus {
    Submitted,
    Running,
    Completed,
    Failed,
    Expired,
}

/// What the polling loop should do after observing a job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Done,
    Retry,
    Abort(&'static str),
}

fn classify(status: OcrJobStatus) -> PollOutcome {
    match status {
        OcrJobStatus::Completed => PollOutcome::Done,
        OcrJobStatus::Submitted | OcrJobStatus::Running => PollOutcome::Retry,
        OcrJobStatus::Failed => PollOutcome::Abort("failed"),
        OcrJobStatus::Expired => PollOutcome::Abort("expired"),
    }
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: OcrDocument<'a>,
    include_image_base64: bool,
}

#[derive(Debug, Serialize)]
struct OcrDocument<'a> {
    #[serde(rename = "type")]
    document_type: &'a str,
    document_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrJob {
    id: String,
    status: OcrJobStatus,
    #[serde(default)]
    pages: Vec<OcrPage>,
}

/// One page of OCR output, in page order.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrPage {
    pub index: u32,
    pub markdown: String,
}

/// Concatenates per-page fragments in page order with a newline separator.
pub fn join_pages(mut pages: Vec<OcrPage>) -> String {
    pages.sort_by_key(|p| p.index);
    pages
        .iter()
        .map(|p| p.markdown.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The single OCR client used by the extraction stage.
#[derive(Clone)]
pub struct OcrClient {
    client: Client,
    api_key: String,
}

impl OcrClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Submits a document and waits for the job to reach a terminal state.
    /// Returns the ordered per-page fragments.
    pub async fn process(
        &self,
        document: &[u8],
        content_type: &str,
    ) -> Result<Vec<OcrPage>, OcrError> {
        let document_url = format!("data:{};base64,{}", content_type, STANDARD.encode(document));
        let request_body = OcrRequest {
            model: OCR_MODEL,
            document: OcrDocument {
                document_type: "document_url",
                document_url: &document_url,
            },
            include_image_base64: false,
        };

        let mut job = self.submit(&request_body).await?;
        let job_id = job.id.clone();
        debug!("OCR job {} submitted ({:?})", job_id, job.status);

        let mut polls = 0;
        loop {
            match classify(job.status) {
                PollOutcome::Done => return Ok(job.pages),
                PollOutcome::Abort(status) => return Err(OcrError::JobFailed { status }),
                PollOutcome::Retry => {
                    if polls >= MAX_POLLS {
                        return Err(OcrError::TimedOut { polls });
                    }
                    polls += 1;
                    tokio::time::sleep(POLL_INTERVAL).await;
                    job = self.fetch_job(&job_id).await?;
                    debug!("OCR job {} poll {}: {:?}", job_id, polls, job.status);
                }
            }
        }
    }

    async fn submit(&self, request_body: &OcrRequest<'_>) -> Result<OcrJob, OcrError> {
        let response = self
            .client
            .post(OCR_API_URL)
            .bearer_auth(&self.api_key)
            .json(request_body)
            .send()
            .await?;
        Self::parse_job(response).await
    }

    async fn fetch_job(&self, job_id: &str) -> Result<OcrJob, OcrError> {
        let response = self
            .client
            .get(format!("{OCR_API_URL}/jobs/{job_id}"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::parse_job(response).await
    }

    async fn parse_job(response: reqwest::Response) -> Result<OcrJob, OcrError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response.json::<OcrJob>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_from_wire_strings() {
        for (wire, expected) in [
            ("\"submitted\"", OcrJobStatus::Submitted),
            ("\"running\"", OcrJobStatus::Running),
            ("\"completed\"", OcrJobStatus::Completed),
            ("\"failed\"", OcrJobStatus::Failed),
            ("\"expired\"", OcrJobStatus::Expired),
        ] {
            let status: OcrJobStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_classify_terminal_statuses() {
        assert_eq!(classify(OcrJobStatus::Completed), PollOutcome::Done);
        assert_eq!(classify(OcrJobStatus::Failed), PollOutcome::Abort("failed"));
        assert_eq!(
            classify(OcrJobStatus::Expired),
            PollOutcome::Abort("expired")
        );
    }

    #[test]
    fn test_classify_pending_statuses_retry() {
        assert_eq!(classify(OcrJobStatus::Submitted), PollOutcome::Retry);
        assert_eq!(classify(OcrJobStatus::Running), PollOutcome::Retry);
    }

    #[test]
    fn test_job_envelope_deserializes_without_pages() {
        let json = r#"{"id": "ocr-123", "status": "running"}"#;
        let job: OcrJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "ocr-123");
        assert_eq!(job.status, OcrJobStatus::Running);
        assert!(job.pages.is_empty());
    }

    #[test]
    fn test_join_pages_orders_by_index() {
        let pages = vec![
            OcrPage {
                index: 1,
                markdown: "second".to_string(),
            },
            OcrPage {
                index: 0,
                markdown: "first".to_string(),
            },
        ];
        assert_eq!(join_pages(pages), "first\nsecond");
    }

    #[test]
    fn test_join_pages_empty() {
        assert_eq!(join_pages(Vec::new()), "");
    }

    #[test]
    fn test_request_body_embeds_data_url() {
        let body = OcrRequest {
            model: OCR_MODEL,
            document: OcrDocument {
                document_type: "document_url",
                document_url: "data:application/pdf;base64,JVBERi0=",
            },
            include_image_base64: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], OCR_MODEL);
        assert_eq!(value["document"]["type"], "document_url");
        assert!(value["document"]["document_url"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,"));
    }
}
