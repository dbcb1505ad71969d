//! Worker pool behaviour with an instrumented uploader
//!
//! Run with: cargo test -p bulkimport-ingest --test worker_pool_tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use bulkimport_ingest::pipeline::pipe::BatchBody;
use bulkimport_ingest::transport::BatchResponse;
use bulkimport_ingest::{
    BatchUploader, ImportConfig, ImportJob, ImportState, ServerError, TransportError,
};
use reqwest::StatusCode;
use std::io::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Tracks how many uploads run at once
#[derive(Default)]
struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicU64,
}

#[async_trait]
impl BatchUploader for ConcurrencyProbe {
    async fn upload(&self, body: BatchBody) -> Result<BatchResponse, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let data = body.read_to_end().await.map_err(TransportError::Decompress)?;
        tokio::time::sleep(Duration::from_millis(5)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(BatchResponse::Success {
            success_count: data.iter().filter(|b| **b == b'\n').count() as u64,
        })
    }
}

/// Fails exactly one chosen batch, succeeding on the rest
struct DropNth {
    target: u64,
    seen: AtomicU64,
}

#[async_trait]
impl BatchUploader for DropNth {
    async fn upload(&self, body: BatchBody) -> Result<BatchResponse, TransportError> {
        let data = body.read_to_end().await.map_err(TransportError::Decompress)?;
        if self.seen.fetch_add(1, Ordering::SeqCst) == self.target {
            return Err(ServerError::new(StatusCode::SERVICE_UNAVAILABLE, b"try later").into());
        }
        Ok(BatchResponse::Success {
            success_count: data.iter().filter(|b| **b == b'\n').count() as u64,
        })
    }
}

fn ndjson(count: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..count {
        writeln!(file, "{{\"n\":{i}}}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_uploads_never_exceed_worker_count() {
    let inputs: Vec<NamedTempFile> = (0..6).map(|_| ndjson(120)).collect();
    let probe = Arc::new(ConcurrencyProbe::default());

    let config = ImportConfig::default()
        .with_batch_size(10)
        .with_workers(3)
        .with_queue_capacity(4)
        .with_pipe_capacity(32);
    let report = ImportJob::new(config, probe.clone())
        .run(inputs.iter().map(|f| f.path()))
        .await
        .unwrap();

    assert!(report.all_complete());
    assert_eq!(report.total_success(), 720);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 72);

    let peak = probe.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "saw {peak} concurrent uploads with 3 workers");
    assert!(peak >= 1);
}

#[tokio::test]
async fn test_dropped_batch_is_not_compensated() {
    let input = ndjson(10);
    let uploader = Arc::new(DropNth {
        target: 1,
        seen: AtomicU64::new(0),
    });

    let config = ImportConfig::default().with_batch_size(4).with_workers(1);
    let report = ImportJob::new(config, uploader)
        .run([input.path()])
        .await
        .unwrap();

    let summary = report.files[0].summary().unwrap();
    assert_eq!(summary.state, ImportState::Draining);
    assert_eq!(summary.tally.success_count, 6);
    assert_eq!(summary.tally.total_records, Some(10));
    assert_eq!(summary.tally.missing_batches(), Some(1));
    assert_eq!(report.pool.dropped, 1);
    assert!(report.incomplete().next().is_some());
}
