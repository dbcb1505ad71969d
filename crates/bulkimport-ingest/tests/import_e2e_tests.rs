//! End-to-end import tests against a mock import endpoint
//!
//! Run with: cargo test -p bulkimport-ingest --test import_e2e_tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bulkimport_ingest::{
    ClientConfig, FileReport, ImportClient, ImportConfig, ImportJob, ImportState,
};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Replies with one success per received line and keeps every body
#[derive(Clone, Default)]
struct RecordingResponder {
    bodies: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Respond for RecordingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let lines = request.body.iter().filter(|b| **b == b'\n').count();
        self.bodies.lock().unwrap().push(request.body.clone());
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "success_count": lines,
        }))
    }
}

/// Reports the first line of every body containing "bad" as a failed record
struct PartialResponder;

impl Respond for PartialResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body);
        let lines: Vec<&str> = body.lines().collect();
        let failed = lines.iter().filter(|l| l.contains("bad")).count();

        if failed == 0 {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "success_count": lines.len()}));
        }

        let results: Vec<_> = lines
            .iter()
            .map(|l| {
                if l.contains("bad") {
                    json!({"status": "failure", "error": {"message": "invalid record"}})
                } else {
                    json!({"status": "success"})
                }
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "partial",
            "message": "Some items failed to import.",
            "success_count": lines.len() - failed,
            "results": results,
        }))
    }
}

fn ndjson(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn records(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{{\"key\":\"{prefix}-{i}\"}}"))
        .collect()
}

fn client_for(server: &MockServer, workers: usize) -> Arc<ImportClient> {
    let config = ClientConfig::with_endpoint(format!("{}/v0/", server.uri()), "test-key")
        .with_max_idle_per_host(workers);
    Arc::new(ImportClient::new(config).unwrap())
}

#[tokio::test]
async fn test_file_arrives_in_order_across_batches() {
    let server = MockServer::start().await;
    let responder = RecordingResponder::default();
    Mock::given(method("POST"))
        .and(path("/v0/"))
        .and(header("authorization", "Basic dGVzdC1rZXk6"))
        .respond_with(responder.clone())
        .mount(&server)
        .await;

    let lines = records("person", 10);
    let input = ndjson(&lines);

    // One worker keeps batches in dispatch order on the wire
    let config = ImportConfig::default().with_batch_size(4).with_workers(1);
    let report = ImportJob::new(config, client_for(&server, 1))
        .run([input.path()])
        .await
        .unwrap();

    assert!(report.all_complete());
    let summary = report.files[0].summary().unwrap();
    assert_eq!(summary.tally.success_count, 10);
    assert_eq!(summary.tally.error_count, 0);

    let bodies = responder.bodies.lock().unwrap().clone();
    let sizes: Vec<usize> = bodies
        .iter()
        .map(|b| b.iter().filter(|c| **c == b'\n').count())
        .collect();
    assert_eq!(sizes, vec![4, 4, 2]);

    let expected: String = lines.iter().map(|l| format!("{l}\n")).collect();
    assert_eq!(bodies.concat(), expected.into_bytes());
}

#[tokio::test]
async fn test_many_files_share_the_pool() {
    let server = MockServer::start().await;
    let responder = RecordingResponder::default();
    Mock::given(method("POST"))
        .respond_with(responder.clone())
        .mount(&server)
        .await;

    let inputs: Vec<NamedTempFile> = (0..5)
        .map(|i| ndjson(&records(&format!("file{i}"), 37 + i)))
        .collect();

    let config = ImportConfig::default()
        .with_batch_size(5)
        .with_workers(3)
        .with_queue_capacity(2);
    let report = ImportJob::new(config, client_for(&server, 3))
        .run(inputs.iter().map(|f| f.path()))
        .await
        .unwrap();

    assert!(report.all_complete());
    for (i, file) in report.files.iter().enumerate() {
        let summary = file.summary().unwrap();
        assert_eq!(summary.file, inputs[i].path().display().to_string());
        assert_eq!(summary.tally.success_count, 37 + i as u64);
    }
    assert_eq!(report.total_success(), 37 * 5 + 10);
    assert_eq!(report.pool.dropped, 0);
}

#[tokio::test]
async fn test_partial_batch_counts_errors_and_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(PartialResponder)
        .mount(&server)
        .await;

    let mut lines = records("ok", 9);
    lines.insert(8, r#"{"key":"bad"}"#.to_string());
    let input = ndjson(&lines);

    let config = ImportConfig::default().with_batch_size(4).with_workers(2);
    let report = ImportJob::new(config, client_for(&server, 2))
        .run([input.path()])
        .await
        .unwrap();

    let summary = report.files[0].summary().unwrap();
    assert_eq!(summary.state, ImportState::Complete);
    assert_eq!(summary.tally.success_count, 9);
    assert_eq!(summary.tally.error_count, 1);
}

#[tokio::test]
async fn test_rejected_batch_leaves_file_incomplete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Valid credentials are required."})),
        )
        .mount(&server)
        .await;

    let input = ndjson(&records("person", 6));
    let config = ImportConfig::default().with_batch_size(4).with_workers(2);
    let report = ImportJob::new(config, client_for(&server, 2))
        .run([input.path()])
        .await
        .unwrap();

    assert!(!report.all_complete());
    assert_eq!(report.pool.dropped, 2);
    match &report.files[0] {
        FileReport::Imported(summary) => {
            assert_eq!(summary.state, ImportState::Draining);
            assert_eq!(summary.tally.success_count, 0);
            assert_eq!(summary.tally.missing_batches(), Some(2));
        }
        other => panic!("expected an imported file, got {other:?}"),
    }
}
