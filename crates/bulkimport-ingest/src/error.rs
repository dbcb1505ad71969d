//! Error types for the import pipeline

use bulkimport_common::CommonError;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// A non-200 reply from the import endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} ({status_code}): {message}")]
pub struct ServerError {
    /// Status line, e.g. "401 Unauthorized"
    pub status: String,

    pub status_code: u16,

    /// `message` from a JSON error body, otherwise the raw body text
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ServerError {
    pub fn new(status: StatusCode, body: &[u8]) -> Self {
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        Self {
            status: status_line,
            status_code: status.as_u16(),
            message,
        }
    }
}

/// Failure to get a decoded reply for one batch
///
/// Every variant leads to the batch being dropped; the worker matches on the
/// kind to decide how to log it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Server rejected batch: {0}")]
    Server(#[from] ServerError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decompress response body: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Unsupported response encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("Malformed batch response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Errors raised while importing a file
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input could not be opened; other files carry on
    #[error("Failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the input failed part-way through
    #[error("Failed to read '{file}': {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing into a batch pipe failed for a reason other than the worker hanging up
    #[error("Batch pipe for '{file}' failed: {source}")]
    Pipe {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch queue closed while '{0}' was still importing")]
    QueueClosed(String),

    #[error("Invalid import configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] CommonError),

    #[error("Import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ImportError {
    /// Whether this error must stop the whole job rather than a single file
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ImportError::Open { .. })
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
