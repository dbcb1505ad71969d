//! Run an import job for the configured files

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use bulkimport_ingest::{FileReport, ImportClient, ImportJob, JobReport};
use std::sync::Arc;
use tracing::{info, warn};

/// Import every file and fail with [`CliError::Incomplete`] unless all of
/// them complete
pub async fn run(config: CliConfig) -> Result<JobReport> {
    let client = ImportClient::new(config.client)?;
    info!(
        endpoint = client.endpoint(),
        files = config.files.len(),
        workers = config.import.workers,
        batch_size = config.import.batch_size,
        "Starting import"
    );

    let report = ImportJob::new(config.import, Arc::new(client))
        .run(&config.files)
        .await?;

    for file in report.incomplete() {
        match file {
            FileReport::Skipped { path, error } => {
                warn!(file = %path.display(), error = %error, "File was not imported")
            }
            FileReport::Imported(summary) => warn!(
                file = %summary.file,
                state = %summary.state,
                "File did not import completely"
            ),
        }
    }

    info!(
        files = report.files.len(),
        complete = report.completed().count(),
        success = report.total_success(),
        errors = report.total_errors(),
        dropped_batches = report.pool.dropped,
        "Import finished"
    );

    let incomplete = report.incomplete().count();
    if incomplete > 0 {
        return Err(CliError::Incomplete {
            incomplete,
            total: report.files.len(),
        });
    }

    Ok(report)
}
