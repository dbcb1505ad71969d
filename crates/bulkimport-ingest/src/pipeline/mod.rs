//! Streaming batch-import pipeline
//!
//! One [`chunker::Chunker`] and one [`aggregator::Aggregator`] run per input
//! file. Chunkers feed a single shared [`queue::BatchQueue`]; the
//! [`worker::WorkerPool`] drains it and replies on each file's own channel.

pub mod aggregator;
pub mod chunker;
pub mod coordinator;
pub mod pipe;
pub mod queue;
pub mod types;
pub mod worker;

pub use aggregator::Aggregator;
pub use chunker::{ChunkStats, Chunker};
pub use coordinator::{FileReport, ImportJob, JobReport};
pub use pipe::{batch_pipe, BatchBody, BatchStats, BatchWriter};
pub use queue::BatchQueue;
pub use types::{BatchRequest, BatchResult, ImportState, ImportSummary, ImportTally};
pub use worker::{PoolStats, WorkerPool};
