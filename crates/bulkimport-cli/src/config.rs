//! Run configuration resolved from flags and environment
//!
//! Pipeline sizes start from [`ImportConfig::from_env`]; the worker count and
//! batch size given on the command line take precedence.

use crate::error::{CliError, Result};
use crate::Cli;
use bulkimport_ingest::{ClientConfig, ImportConfig};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub files: Vec<PathBuf>,
    pub client: ClientConfig,
    pub import: ImportConfig,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.workers == 0 {
            return Err(CliError::config("--workers must be at least 1"));
        }
        if cli.batch_size == 0 {
            return Err(CliError::config("--batch-size must be at least 1"));
        }
        if cli.files.is_empty() {
            return Err(CliError::config("no input files given"));
        }

        let import = ImportConfig::from_env()?
            .with_workers(cli.workers)
            .with_batch_size(cli.batch_size);

        let client = match &cli.endpoint {
            Some(endpoint) => ClientConfig::with_endpoint(endpoint.clone(), cli.key.clone()),
            None => ClientConfig::for_host(&cli.host, cli.key.clone()),
        }
        .with_max_idle_per_host(import.workers);

        Ok(Self {
            files: cli.files.clone(),
            client,
            import,
        })
    }
}
