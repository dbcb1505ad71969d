//! Batch import response types
//!
//! The endpoint replies with a JSON object carrying `status` and
//! `success_count`, plus `message` and per-record `results` when some records
//! were rejected. Replies are decoded into [`BatchResponse`] so callers match
//! on the outcome instead of probing loosely typed fields.

use serde::{Deserialize, Serialize};

/// Outcome of a single record within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub status: RecordStatus,

    /// Server-provided error detail, a string or an object depending on the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl RecordOutcome {
    pub fn is_failure(&self) -> bool {
        self.status == RecordStatus::Failure
    }

    /// Error detail rendered for logs
    pub fn error_text(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "no error detail".to_string(),
        }
    }
}

/// Reply body as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
struct RawBatchResponse {
    status: String,
    success_count: u64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Option<Vec<RecordOutcome>>,
}

/// Decoded reply for one uploaded batch
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBatchResponse")]
pub enum BatchResponse {
    /// Every record in the batch was imported
    Success { success_count: u64 },

    /// Any status other than "success"; some records may still have been imported
    Partial {
        status: String,
        message: Option<String>,
        success_count: u64,
        results: Vec<RecordOutcome>,
    },
}

impl From<RawBatchResponse> for BatchResponse {
    fn from(raw: RawBatchResponse) -> Self {
        if raw.status == "success" {
            BatchResponse::Success {
                success_count: raw.success_count,
            }
        } else {
            BatchResponse::Partial {
                status: raw.status,
                message: raw.message,
                success_count: raw.success_count,
                results: raw.results.unwrap_or_default(),
            }
        }
    }
}

impl BatchResponse {
    pub fn success_count(&self) -> u64 {
        match self {
            BatchResponse::Success { success_count } => *success_count,
            BatchResponse::Partial { success_count, .. } => *success_count,
        }
    }

    /// Records the server reported as failed
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        let results: &[RecordOutcome] = match self {
            BatchResponse::Success { .. } => &[],
            BatchResponse::Partial { results, .. } => results,
        };
        results.iter().filter(|r| r.is_failure())
    }
}
