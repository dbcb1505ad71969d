//! Import pipeline configuration
//!
//! Sizes of the batches, queues and buffers that bound how much of a file is
//! in memory or in flight at once.

use crate::error::{ImportError, Result};
use bulkimport_common::env::parse_var;
use serde::{Deserialize, Serialize};

// ============================================================================
// Pipeline Defaults
// ============================================================================

/// Records per upload request.
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Concurrent upload workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Slots in the queue shared by every file and worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Slots in each file's response channel.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 100;

/// Bytes buffered between the chunker and the worker streaming a batch.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Read buffer for input files (1 MiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Successful records between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub workers: usize,
    pub queue_capacity: usize,
    pub response_capacity: usize,
    pub pipe_capacity: usize,
    pub read_buffer_size: usize,
    pub progress_interval: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ImportConfig {
    /// Defaults overridden by `BULKIMPORT_*` environment variables
    ///
    /// Reads `BULKIMPORT_BATCH_SIZE`, `BULKIMPORT_WORKERS`,
    /// `BULKIMPORT_QUEUE_CAPACITY`, `BULKIMPORT_RESPONSE_CAPACITY`,
    /// `BULKIMPORT_PIPE_CAPACITY`, `BULKIMPORT_READ_BUFFER_SIZE` and
    /// `BULKIMPORT_PROGRESS_INTERVAL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = parse_var("BULKIMPORT_BATCH_SIZE")? {
            config.batch_size = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_WORKERS")? {
            config.workers = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_QUEUE_CAPACITY")? {
            config.queue_capacity = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_RESPONSE_CAPACITY")? {
            config.response_capacity = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_PIPE_CAPACITY")? {
            config.pipe_capacity = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_READ_BUFFER_SIZE")? {
            config.read_buffer_size = v;
        }
        if let Some(v) = parse_var("BULKIMPORT_PROGRESS_INTERVAL")? {
            config.progress_interval = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_response_capacity(mut self, capacity: usize) -> Self {
        self.response_capacity = capacity;
        self
    }

    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Reject sizes that would stall the pipeline
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("batch_size", self.batch_size),
            ("workers", self.workers),
            ("queue_capacity", self.queue_capacity),
            ("response_capacity", self.response_capacity),
            ("pipe_capacity", self.pipe_capacity),
            ("read_buffer_size", self.read_buffer_size),
        ];

        if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
            return Err(ImportError::invalid_config(format!(
                "{name} must be greater than zero"
            )));
        }

        if self.progress_interval == 0 {
            return Err(ImportError::invalid_config(
                "progress_interval must be greater than zero",
            ));
        }

        Ok(())
    }
}
