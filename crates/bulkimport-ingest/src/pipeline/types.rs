//! Messages and state shared by the pipeline stages

use crate::pipeline::pipe::BatchBody;
use crate::transport::BatchResponse;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One batch waiting for a worker
///
/// The body is the read half of a pipe the chunker may still be writing.
#[derive(Debug)]
pub struct BatchRequest {
    /// Name of the file the batch came from, for logging
    pub file: Arc<str>,

    /// Zero-based position of the batch within its file
    pub index: u64,

    pub body: BatchBody,

    /// Response channel of the file's aggregator
    pub reply_to: mpsc::Sender<BatchResult>,
}

/// Message consumed by a file's aggregator
///
/// A batch whose upload fails produces no message at all.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    /// A worker got a decoded reply for a batch
    Delivered { batch: u64, response: BatchResponse },

    /// The chunker reached the end of the file; sent once, straight from the chunker
    EndOfInput { total_records: u64, batches: u64 },
}

/// Aggregator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportState {
    /// Responses arriving, end of input not yet seen
    Running,
    /// End of input seen, waiting for outstanding batches
    Draining,
    /// Every record is accounted for
    Complete,
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportState::Running => "running",
            ImportState::Draining => "draining",
            ImportState::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Running counts for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportTally {
    pub success_count: u64,
    pub error_count: u64,

    /// Records read from the file, known once end of input is seen
    pub total_records: Option<u64>,

    /// Batches the chunker dispatched, known once end of input is seen
    pub batches_dispatched: Option<u64>,

    /// Delivered replies so far
    pub responses: u64,
}

impl ImportTally {
    pub fn saw_end_of_input(&self) -> bool {
        self.total_records.is_some()
    }

    /// Completion heuristic: successes cover every record not reported as failed
    pub fn is_complete(&self) -> bool {
        match self.total_records {
            Some(total) => self.success_count >= total.saturating_sub(self.error_count),
            None => false,
        }
    }

    /// Batches that never produced a reply, once the total is known
    pub fn missing_batches(&self) -> Option<u64> {
        self.batches_dispatched
            .map(|dispatched| dispatched.saturating_sub(self.responses))
    }
}

/// Final state of one imported file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub state: ImportState,
    pub tally: ImportTally,
}

impl ImportSummary {
    pub fn is_complete(&self) -> bool {
        self.state == ImportState::Complete
    }
}
