//! bulkimport CLI library
//!
//! Command-line front end for the batch importer.
//!
//! # Overview
//!
//! `bulkimport [OPTIONS] <FILE>...` streams each newline-delimited JSON file
//! to the import endpoint in batches, using a fixed pool of upload workers
//! shared by every file.
//!
//! - **Arguments**: [`Cli`]
//! - **Settings**: flags and environment resolved into [`config::CliConfig`]
//! - **Running**: [`import::run`]

pub mod config;
pub mod error;
pub mod import;

// Re-export commonly used types
pub use config::CliConfig;
pub use error::{CliError, Result};

use bulkimport_ingest::config::{DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};
use bulkimport_ingest::transport::client::DEFAULT_HOST;
use clap::Parser;
use std::path::PathBuf;

/// API key used when none is configured; the server rejects it
pub const DEFAULT_API_KEY: &str = "00000000-0000-0000-0000-000000000000";

/// bulkimport - stream NDJSON files into a remote collection
#[derive(Parser, Debug)]
#[command(name = "bulkimport")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Newline-delimited JSON files to import
    #[arg(value_name = "FILE", required_unless_present = "markdown_help")]
    pub files: Vec<PathBuf>,

    /// API key, sent as the basic-auth user name
    #[arg(
        short,
        long,
        env = "BULKIMPORT_API_KEY",
        default_value = DEFAULT_API_KEY,
        hide_env_values = true
    )]
    pub key: String,

    /// Number of concurrent upload workers
    #[arg(short, long, env = "BULKIMPORT_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// API host
    #[arg(long, env = "BULKIMPORT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Full import URL, overriding --host (e.g. "http://localhost:8080/v0/")
    #[arg(long, env = "BULKIMPORT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Records per upload request
    #[arg(short, long, env = "BULKIMPORT_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}
