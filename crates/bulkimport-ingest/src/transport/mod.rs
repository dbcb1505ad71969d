//! Transport to the remote import endpoint
//!
//! [`ImportClient`] is the HTTP implementation of [`BatchUploader`]; the
//! pipeline only depends on the trait so tests can substitute their own.

pub mod client;
pub mod decode;
pub mod endpoints;
pub mod types;

pub use client::{ClientConfig, ImportClient};
pub use types::{BatchResponse, RecordOutcome, RecordStatus};

use crate::error::TransportError;
use crate::pipeline::pipe::BatchBody;
use async_trait::async_trait;

/// Uploads one batch body and returns the decoded reply
#[async_trait]
pub trait BatchUploader: Send + Sync {
    async fn upload(&self, body: BatchBody) -> Result<BatchResponse, TransportError>;
}
