//! bulkimport common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, environment parsing and logging setup for the
//! bulkimport workspace members.
//!
//! # Example
//!
//! ```no_run
//! use bulkimport_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> bulkimport_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod env;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
