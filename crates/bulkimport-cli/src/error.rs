//! Error types for the bulkimport CLI
//!
//! Messages are written for the person running the command.

use bulkimport_common::CommonError;
use bulkimport_ingest::{ImportError, TransportError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status when some file was skipped or not fully imported
pub const EXIT_INCOMPLETE: i32 = 2;

/// Exit status for everything else that stops the run
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum CliError {
    /// Flag or environment value is out of range
    #[error("Configuration error: {0}. Check the command-line flags and BULKIMPORT_* environment variables.")]
    Config(String),

    /// The HTTP client could not be built
    #[error("Failed to set up the import client: {0}")]
    Client(#[from] TransportError),

    /// The import stopped on a fatal error
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Logging or environment configuration was invalid
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Some files were skipped or did not finish
    #[error("{incomplete} of {total} file(s) did not import completely. See the log above for details.")]
    Incomplete { incomplete: usize, total: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Incomplete { .. } => EXIT_INCOMPLETE,
            _ => EXIT_FAILURE,
        }
    }
}
