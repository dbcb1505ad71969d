//! HTTP client for the batch import endpoint
//!
//! Posts one streamed batch per request, authenticated with the API key as
//! the basic-auth username.

use crate::error::{ServerError, TransportError};
use crate::pipeline::pipe::BatchBody;
use crate::transport::decode::decode_response;
use crate::transport::endpoints;
use crate::transport::types::BatchResponse;
use crate::transport::BatchUploader;
use async_trait::async_trait;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Client Constants
// ============================================================================

/// Default import host.
pub const DEFAULT_HOST: &str = "api.orchestrate.io";

/// Identifies this client to the server.
pub const DEFAULT_USER_AGENT: &str = "bulkimport";

/// Media type of an NDJSON batch import body.
pub const IMPORT_CONTENT_TYPE: &str = "application/orchestrate-export-stream+json";

/// Time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Time allowed between reads while waiting on the server.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Idle keep-alive connections kept per host when not tied to a worker count.
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 8;

/// Transport settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full import URL, e.g. `https://api.orchestrate.io/v0/`
    pub endpoint: String,
    pub api_key: String,
    pub user_agent: String,
    pub content_type: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Keep one idle connection per worker so batches reuse connections
    pub max_idle_per_host: usize,
}

impl ClientConfig {
    pub fn for_host(host: &str, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(endpoints::import_url(host), api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            content_type: IMPORT_CONTENT_TYPE.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
        }
    }

    pub fn with_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.max_idle_per_host = max_idle;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// HTTP implementation of [`BatchUploader`]
#[derive(Debug, Clone)]
pub struct ImportClient {
    client: Client,
    config: ClientConfig,
}

impl ImportClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// POST a batch and decode the reply, expecting 200 OK
    pub async fn upload_batch(&self, body: reqwest::Body) -> Result<BatchResponse, TransportError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(&self.config.api_key, Some(""))
            .header(USER_AGENT, &self.config.user_agent)
            .header(CONTENT_TYPE, &self.config.content_type)
            .header(ACCEPT_ENCODING, "gzip, deflate")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            // Drain the body so the connection can go back to the pool
            let body = response.bytes().await?;
            return Err(ServerError::new(status, &body).into());
        }

        let encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        debug!(
            bytes = body.len(),
            encoding = encoding.as_deref().unwrap_or("identity"),
            "Received batch response"
        );

        decode_response(encoding.as_deref(), &body)
    }
}

#[async_trait]
impl BatchUploader for ImportClient {
    async fn upload(&self, body: BatchBody) -> Result<BatchResponse, TransportError> {
        self.upload_batch(body.into_request_body()).await
    }
}
