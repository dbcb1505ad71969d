//! Per-file tally of batch replies
//!
//! The aggregator is the only owner of its file's [`ImportTally`]. It moves
//! from `Running` to `Draining` when the chunker reports end of input, and
//! to `Complete` once the successes cover every record not reported as
//! failed. A batch dropped by the transport never replies, so a file can end
//! with its channel closed while still `Draining`.

use crate::pipeline::types::{BatchResult, ImportState, ImportSummary, ImportTally};
use crate::transport::BatchResponse;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct Aggregator {
    file: String,
    progress_interval: u64,
    state: ImportState,
    tally: ImportTally,
}

impl Aggregator {
    pub fn new(file: impl Into<String>, progress_interval: u64) -> Self {
        Self {
            file: file.into(),
            progress_interval: progress_interval.max(1),
            state: ImportState::Running,
            tally: ImportTally::default(),
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn tally(&self) -> &ImportTally {
        &self.tally
    }

    /// Fold one message into the tally and return the resulting state
    ///
    /// Messages arriving after completion are ignored.
    pub fn apply(&mut self, result: BatchResult) -> ImportState {
        if self.state == ImportState::Complete {
            return self.state;
        }

        match result {
            BatchResult::Delivered { batch, response } => self.record_response(batch, response),
            BatchResult::EndOfInput {
                total_records,
                batches,
            } => {
                self.tally.total_records = Some(total_records);
                self.tally.batches_dispatched = Some(batches);
                self.state = ImportState::Draining;
            }
        }

        if self.tally.is_complete() {
            self.state = ImportState::Complete;
        }
        self.state
    }

    fn record_response(&mut self, batch: u64, response: BatchResponse) {
        self.tally.responses += 1;

        if let BatchResponse::Partial {
            status, message, ..
        } = &response
        {
            warn!(
                file = %self.file,
                batch,
                status = %status,
                message = message.as_deref().unwrap_or(""),
                "Batch partially imported"
            );
        }

        for failure in response.failures() {
            self.tally.error_count += 1;
            warn!(
                file = %self.file,
                batch,
                error = %failure.error_text(),
                "Record failed to import"
            );
        }

        let added = response.success_count();
        self.tally.success_count += added;

        if added > 0 && self.tally.success_count % self.progress_interval == 0 {
            info!(
                file = %self.file,
                success = self.tally.success_count,
                "Import progress"
            );
        }
    }

    /// Consume the file's response channel until the file completes or the
    /// channel closes
    pub async fn run(mut self, mut rx: mpsc::Receiver<BatchResult>) -> ImportSummary {
        while let Some(result) = rx.recv().await {
            if self.apply(result) == ImportState::Complete {
                break;
            }
        }

        self.finish()
    }

    /// Log the final line for the file and hand back its summary
    pub fn finish(self) -> ImportSummary {
        let tally = &self.tally;
        match self.state {
            ImportState::Complete => info!(
                file = %self.file,
                success = tally.success_count,
                errors = tally.error_count,
                batches = tally.batches_dispatched.unwrap_or_default(),
                "Import complete"
            ),
            state => warn!(
                file = %self.file,
                state = %state,
                success = tally.success_count,
                errors = tally.error_count,
                total = ?tally.total_records,
                missing_batches = ?tally.missing_batches(),
                "Import ended before every record was accounted for"
            ),
        }

        ImportSummary {
            file: self.file,
            state: self.state,
            tally: self.tally,
        }
    }
}
