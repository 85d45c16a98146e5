use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per uploaded document, created at intake and advanced by the
/// pipeline run that owns it. Exactly one run mutates a given row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_path: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Processing status of an uploaded document.
///
/// Statuses advance forward only: received → extracting → structuring →
/// stored. `Failed` is terminal and reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Received,
    Extracting,
    Structuring,
    Stored,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Received => "received",
            DocumentStatus::Extracting => "extracting",
            DocumentStatus::Structuring => "structuring",
            DocumentStatus::Stored => "stored",
            DocumentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "received" => Some(DocumentStatus::Received),
            "extracting" => Some(DocumentStatus::Extracting),
            "structuring" => Some(DocumentStatus::Structuring),
            "stored" => Some(DocumentStatus::Stored),
            "failed" => Some(DocumentStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Stored | DocumentStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            DocumentStatus::Received => 0,
            DocumentStatus::Extracting => 1,
            DocumentStatus::Structuring => 2,
            DocumentStatus::Stored => 3,
            DocumentStatus::Failed => 4,
        }
    }

    /// Whether this status may advance to `next`. Forward transitions only;
    /// `Failed` is reachable from any non-terminal state and absorbs.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == DocumentStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(DocumentStatus::Received.can_transition_to(DocumentStatus::Extracting));
        assert!(DocumentStatus::Extracting.can_transition_to(DocumentStatus::Structuring));
        assert!(DocumentStatus::Structuring.can_transition_to(DocumentStatus::Stored));
        // Skipping a stage forward is still monotonic
        assert!(DocumentStatus::Received.can_transition_to(DocumentStatus::Stored));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!DocumentStatus::Stored.can_transition_to(DocumentStatus::Extracting));
        assert!(!DocumentStatus::Structuring.can_transition_to(DocumentStatus::Received));
        assert!(!DocumentStatus::Extracting.can_transition_to(DocumentStatus::Extracting));
    }

    #[test]
    fn test_failed_reachable_from_any_non_terminal() {
        assert!(DocumentStatus::Received.can_transition_to(DocumentStatus::Failed));
        assert!(DocumentStatus::Extracting.can_transition_to(DocumentStatus::Failed));
        assert!(DocumentStatus::Structuring.can_transition_to(DocumentStatus::Failed));
    }

    #[test]
    fn test_terminal_states_absorb() {
        assert!(!DocumentStatus::Stored.can_transition_to(DocumentStatus::Failed));
        assert!(!DocumentStatus::Failed.can_transition_to(DocumentStatus::Received));
        assert!(!DocumentStatus::Failed.can_transition_to(DocumentStatus::Failed));
    }

    #[test]
    fn test_round_trip_through_strings() {
        for status in [
            DocumentStatus::Received,
            DocumentStatus::Extracting,
            DocumentStatus::Structuring,
            DocumentStatus::Stored,
            DocumentStatus::Failed,
        ] {
            assert_eq!(DocumentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DocumentStatus::parse("processed"), None);
    }
}
