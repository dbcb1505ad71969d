//! bulkimport ingest library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Streams newline-delimited JSON files to a remote import endpoint.
//!
//! # Overview
//!
//! - **Transport**: authenticated HTTPS upload of one batch, decoding of the
//!   (optionally compressed) JSON reply ([`transport`])
//! - **Chunker**: slices one input into batches of `batch_size` records and
//!   streams each batch through a bounded pipe ([`pipeline::chunker`])
//! - **Worker pool**: a fixed number of workers draining one shared, bounded
//!   queue of batch requests ([`pipeline::worker`])
//! - **Aggregator**: per-file tally of successes and errors that decides when
//!   the file is done ([`pipeline::aggregator`])
//! - **Coordinator**: runs one chunker/aggregator pair per file and waits for
//!   all of them ([`pipeline::coordinator`])
//!
//! # Example
//!
//! ```no_run
//! use bulkimport_ingest::{ClientConfig, ImportClient, ImportConfig, ImportJob};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImportConfig::default();
//!     let client = ImportClient::new(
//!         ClientConfig::for_host("api.orchestrate.io", "my-api-key")
//!             .with_max_idle_per_host(config.workers),
//!     )?;
//!
//!     let report = ImportJob::new(config, Arc::new(client))
//!         .run(["people.ndjson"])
//!         .await?;
//!     println!("{} file(s) complete", report.completed().count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod transport;

// Re-export commonly used types
pub use config::ImportConfig;
pub use error::{ImportError, ServerError, TransportError};
pub use pipeline::coordinator::{FileReport, ImportJob, JobReport};
pub use pipeline::types::{ImportState, ImportSummary, ImportTally};
pub use transport::{BatchUploader, ClientConfig, ImportClient};
