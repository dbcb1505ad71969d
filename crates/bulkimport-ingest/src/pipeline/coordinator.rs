//! Import job coordinator
//!
//! Runs one chunker and one aggregator per input file, all sharing a single
//! queue and worker pool:
//! 1. Start the worker pool on a fresh bounded queue
//! 2. Spawn one import task per file
//! 3. Wait for every file to complete or end, then close the queue
//!
//! A file that cannot be opened is skipped. A read failure on any file
//! aborts the whole job.

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::pipeline::aggregator::Aggregator;
use crate::pipeline::chunker::Chunker;
use crate::pipeline::queue::BatchQueue;
use crate::pipeline::types::ImportSummary;
use crate::pipeline::worker::{PoolStats, WorkerPool};
use crate::transport::BatchUploader;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Outcome for one input path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum FileReport {
    /// The file was read to the end; see the summary for its final state
    Imported(ImportSummary),

    /// The file could not be opened and nothing was sent
    Skipped { path: PathBuf, error: String },
}

impl FileReport {
    pub fn name(&self) -> String {
        match self {
            FileReport::Imported(summary) => summary.file.clone(),
            FileReport::Skipped { path, .. } => path.display().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FileReport::Imported(summary) if summary.is_complete())
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        match self {
            FileReport::Imported(summary) => Some(summary),
            FileReport::Skipped { .. } => None,
        }
    }
}

/// Result of a whole job, one entry per input in the order given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub files: Vec<FileReport>,
    pub pool: PoolStats,
}

impl JobReport {
    pub fn completed(&self) -> impl Iterator<Item = &ImportSummary> {
        self.files
            .iter()
            .filter(|f| f.is_complete())
            .filter_map(FileReport::summary)
    }

    /// Files that were skipped or ended before every record was accounted for
    pub fn incomplete(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_complete())
    }

    pub fn all_complete(&self) -> bool {
        self.files.iter().all(FileReport::is_complete)
    }

    pub fn total_success(&self) -> u64 {
        self.files
            .iter()
            .filter_map(FileReport::summary)
            .map(|s| s.tally.success_count)
            .sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.files
            .iter()
            .filter_map(FileReport::summary)
            .map(|s| s.tally.error_count)
            .sum()
    }
}

/// Imports a set of files through one shared worker pool
pub struct ImportJob {
    config: ImportConfig,
    uploader: Arc<dyn BatchUploader>,
}

impl ImportJob {
    pub fn new(config: ImportConfig, uploader: Arc<dyn BatchUploader>) -> Self {
        Self { config, uploader }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import every file concurrently and wait for all of them
    ///
    /// Returns early with the error if any file hits a fatal error; the
    /// remaining imports and in-flight uploads are abandoned.
    pub async fn run<I, P>(&self, files: I) -> Result<JobReport>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.config.validate()?;

        let queue = BatchQueue::bounded(self.config.queue_capacity);
        let pool = WorkerPool::start(
            self.config.workers,
            queue.clone(),
            Arc::clone(&self.uploader),
        );

        let mut imports = JoinSet::new();
        for (position, path) in files.into_iter().enumerate() {
            let path = path.as_ref().to_path_buf();
            let config = self.config.clone();
            let queue = queue.clone();
            imports.spawn(async move {
                let report = import_file(path, &config, queue).await?;
                Ok::<_, ImportError>((position, report))
            });
        }

        let mut reports = Vec::with_capacity(imports.len());
        while let Some(joined) = imports.join_next().await {
            match joined? {
                Ok(entry) => reports.push(entry),
                Err(e) => {
                    error!(error = %e, "Aborting import");
                    imports.abort_all();
                    queue.close();
                    return Err(e);
                }
            }
        }
        reports.sort_by_key(|(position, _)| *position);

        let pool = pool.shutdown().await?;
        Ok(JobReport {
            files: reports.into_iter().map(|(_, report)| report).collect(),
            pool,
        })
    }
}

/// Chunk one file into the shared queue and tally its replies
async fn import_file(path: PathBuf, config: &ImportConfig, queue: BatchQueue) -> Result<FileReport> {
    let name = path.display().to_string();

    let (file, size) = match open_input(&path).await {
        Ok(opened) => opened,
        Err(e) => {
            error!(file = %name, error = %e, "Skipping file");
            return Ok(FileReport::Skipped {
                path,
                error: e.to_string(),
            });
        }
    };

    info!(file = %name, bytes = size, "Importing");

    let (tx, rx) = mpsc::channel(config.response_capacity);
    let aggregator = tokio::spawn(Aggregator::new(name.as_str(), config.progress_interval).run(rx));

    let chunker = Chunker::new(
        Arc::from(name.as_str()),
        BufReader::with_capacity(config.read_buffer_size, file),
        config.batch_size,
        config.pipe_capacity,
        queue,
        tx,
    );

    if let Err(e) = chunker.run().await {
        aggregator.abort();
        return Err(e);
    }

    Ok(FileReport::Imported(aggregator.await?))
}

async fn open_input(path: &Path) -> Result<(File, u64)> {
    let open_error = |source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(open_error)?;
    let metadata = file.metadata().await.map_err(open_error)?;
    if metadata.is_dir() {
        return Err(open_error(io::Error::other("is a directory")));
    }

    Ok((file, metadata.len()))
}
