//! Splits one input stream into batches of consecutive records
//!
//! Each batch gets its own pipe. The request carrying the pipe's read half is
//! queued before the first record is written, so a worker can start
//! streaming the body while the rest of the batch is still being read.

use crate::error::{ImportError, Result};
use crate::pipeline::pipe::{batch_pipe, BatchWriter};
use crate::pipeline::queue::BatchQueue;
use crate::pipeline::types::{BatchRequest, BatchResult};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counts for one chunked file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub records: u64,
    pub batches: u64,
    /// Batches whose worker hung up before the body was fully written
    pub abandoned: u64,
}

pub struct Chunker<R> {
    file: Arc<str>,
    reader: R,
    batch_size: u64,
    pipe_capacity: usize,
    queue: BatchQueue,
    reply_to: mpsc::Sender<BatchResult>,
}

impl<R: AsyncBufRead + Unpin> Chunker<R> {
    pub fn new(
        file: Arc<str>,
        reader: R,
        batch_size: usize,
        pipe_capacity: usize,
        queue: BatchQueue,
        reply_to: mpsc::Sender<BatchResult>,
    ) -> Self {
        Self {
            file,
            reader,
            batch_size: batch_size.max(1) as u64,
            pipe_capacity,
            queue,
            reply_to,
        }
    }

    /// Read the input to the end, queueing one request per batch
    ///
    /// Finishes by sending `EndOfInput` on the file's own response channel.
    /// A read error ends chunking with [`ImportError::Read`].
    pub async fn run(mut self) -> Result<ChunkStats> {
        let mut stats = ChunkStats::default();
        let mut current: Option<BatchWriter> = None;
        let mut line = Vec::new();

        loop {
            line.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut line)
                .await
                .map_err(|source| ImportError::Read {
                    file: self.file.to_string(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            if stats.records % self.batch_size == 0 {
                if let Some(previous) = current.take() {
                    self.close_batch(previous, stats.batches - 1, &mut stats)
                        .await?;
                }
                current = Some(self.open_batch(stats.batches).await?);
                stats.batches += 1;
            }

            // Unterminated last line
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }

            if let Some(writer) = current.as_mut() {
                writer
                    .write_record(&line)
                    .await
                    .map_err(|source| ImportError::Pipe {
                        file: self.file.to_string(),
                        source,
                    })?;
            }
            stats.records += 1;
        }

        if let Some(last) = current.take() {
            self.close_batch(last, stats.batches - 1, &mut stats).await?;
        }

        let end = BatchResult::EndOfInput {
            total_records: stats.records,
            batches: stats.batches,
        };
        if self.reply_to.send(end).await.is_err() {
            debug!(file = %self.file, "Aggregator finished before end of input");
        }

        debug!(
            file = %self.file,
            records = stats.records,
            batches = stats.batches,
            "Finished reading input"
        );

        Ok(stats)
    }

    async fn open_batch(&self, index: u64) -> Result<BatchWriter> {
        let (writer, body) = batch_pipe(self.pipe_capacity);
        let request = BatchRequest {
            file: Arc::clone(&self.file),
            index,
            body,
            reply_to: self.reply_to.clone(),
        };

        self.queue
            .push(request)
            .await
            .map_err(|_| ImportError::QueueClosed(self.file.to_string()))?;

        Ok(writer)
    }

    async fn close_batch(
        &self,
        writer: BatchWriter,
        index: u64,
        stats: &mut ChunkStats,
    ) -> Result<()> {
        let batch = writer.finish().await.map_err(|source| ImportError::Pipe {
            file: self.file.to_string(),
            source,
        })?;

        if batch.abandoned {
            stats.abandoned += 1;
            warn!(
                file = %self.file,
                batch = index,
                records = batch.records,
                "Upload ended before the batch was fully sent"
            );
        } else {
            debug!(
                file = %self.file,
                batch = index,
                records = batch.records,
                bytes = batch.bytes,
                "Batch written"
            );
        }

        Ok(())
    }
}
