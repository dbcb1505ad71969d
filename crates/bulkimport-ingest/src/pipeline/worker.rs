//! Fixed-size pool of upload workers
//!
//! Every worker loops on the shared [`BatchQueue`]: take a request, upload
//! its body, send the decoded reply to the request's file. A failed upload
//! is logged and the batch is dropped without a reply. Workers exit once
//! the queue is closed and empty.

use crate::error::{ImportError, Result, TransportError};
use crate::pipeline::queue::BatchQueue;
use crate::pipeline::types::{BatchRequest, BatchResult};
use crate::transport::BatchUploader;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Per-worker and pool-wide counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Batches whose reply reached the aggregator
    pub delivered: u64,
    /// Batches dropped after a transport failure
    pub dropped: u64,
}

impl PoolStats {
    fn merge(&mut self, other: PoolStats) {
        self.delivered += other.delivered;
        self.dropped += other.dropped;
    }
}

pub struct WorkerPool {
    queue: BatchQueue,
    workers: JoinSet<PoolStats>,
}

impl WorkerPool {
    /// Spawn `workers` tasks draining `queue`
    pub fn start(workers: usize, queue: BatchQueue, uploader: Arc<dyn BatchUploader>) -> Self {
        let mut set = JoinSet::new();
        for id in 0..workers.max(1) {
            set.spawn(run_worker(id, queue.clone(), Arc::clone(&uploader)));
        }
        debug!(workers = set.len(), "Started upload workers");

        Self {
            queue,
            workers: set,
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Close the queue and wait for every worker to finish its current batch
    pub async fn shutdown(mut self) -> Result<PoolStats> {
        self.queue.close();

        let mut total = PoolStats::default();
        while let Some(joined) = self.workers.join_next().await {
            total.merge(joined.map_err(ImportError::Task)?);
        }

        debug!(
            delivered = total.delivered,
            dropped = total.dropped,
            "Upload workers stopped"
        );
        Ok(total)
    }
}

async fn run_worker(id: usize, queue: BatchQueue, uploader: Arc<dyn BatchUploader>) -> PoolStats {
    let mut stats = PoolStats::default();

    while let Some(request) = queue.pop().await {
        let BatchRequest {
            file,
            index,
            body,
            reply_to,
        } = request;

        match uploader.upload(body).await {
            Ok(response) => {
                stats.delivered += 1;
                let delivered = BatchResult::Delivered {
                    batch: index,
                    response,
                };
                if reply_to.send(delivered).await.is_err() {
                    debug!(worker = id, file = %file, batch = index, "Reply after file finished");
                }
            }
            Err(e) => {
                stats.dropped += 1;
                log_dropped(&file, index, &e);
            }
        }
    }

    debug!(worker = id, "Queue closed, worker exiting");
    stats
}

fn log_dropped(file: &str, batch: u64, err: &TransportError) {
    match err {
        TransportError::Server(server) => warn!(
            file,
            batch,
            status = server.status_code,
            error = %server,
            "Server rejected batch, dropping it"
        ),
        TransportError::Http(e) if e.is_timeout() => {
            warn!(file, batch, error = %e, "Batch upload timed out, dropping it")
        }
        TransportError::Http(e) => {
            warn!(file, batch, error = %e, "Batch upload failed, dropping it")
        }
        TransportError::Decompress(_)
        | TransportError::UnsupportedEncoding(_)
        | TransportError::MalformedResponse(_) => {
            error!(file, batch, error = %err, "Unreadable batch response, dropping it")
        }
    }
}
