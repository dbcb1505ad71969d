//! Bounded queue of batch requests shared by every chunker and worker

use crate::pipeline::types::BatchRequest;
use async_channel::{Receiver, Sender};

/// Multi-producer, multi-consumer queue with a fixed number of slots
///
/// Cloning gives another handle to the same queue. The queue stays open
/// until [`BatchQueue::close`] is called, even if every chunker is done.
#[derive(Debug, Clone)]
pub struct BatchQueue {
    tx: Sender<BatchRequest>,
    rx: Receiver<BatchRequest>,
}

impl BatchQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        Self { tx, rx }
    }

    /// Enqueue a request, waiting while the queue is full
    ///
    /// Gives the request back if the queue was closed.
    pub async fn push(&self, request: BatchRequest) -> Result<(), BatchRequest> {
        self.tx.send(request).await.map_err(|e| e.into_inner())
    }

    /// Next request, or `None` once the queue is closed and empty
    pub async fn pop(&self) -> Option<BatchRequest> {
        self.rx.recv().await.ok()
    }

    /// Stop accepting requests; workers finish what is already queued
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}
