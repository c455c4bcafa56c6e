//! HTTP seam between the dialogue client and the network.

use super::{DialogueError, DialogueRequest};
use async_trait::async_trait;
use std::time::Duration;

/// Connect timeout applied to every request, independent of the per-call bound.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Raw outcome of one HTTP exchange that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Undecoded body text.
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs single HTTP exchanges. No retries at this layer.
///
/// Implementations map connection failures and timeouts to
/// [`DialogueError::Network`]; any response that arrived, whatever its
/// status, is returned as `Ok`.
#[async_trait]
pub trait DialogueTransport: Send + Sync {
    /// POST `body` as JSON to `url`.
    async fn post_json(
        &self,
        url: &str,
        body: &DialogueRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, DialogueError>;

    /// GET `url`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, DialogueError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    async fn finish(
        resp: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<TransportResponse, DialogueError> {
        let resp = resp.map_err(network_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(network_error)?;
        Ok(TransportResponse { status, body })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn network_error(e: reqwest::Error) -> DialogueError {
    if e.is_timeout() {
        DialogueError::Network(format!("request timed out: {e}"))
    } else if e.is_connect() {
        DialogueError::Network(format!("connection failed: {e}"))
    } else {
        DialogueError::Network(e.to_string())
    }
}

#[async_trait]
impl DialogueTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &DialogueRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, DialogueError> {
        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await;
        Self::finish(resp).await
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, DialogueError> {
        let resp = self.client.get(url).timeout(timeout).send().await;
        Self::finish(resp).await
    }
}
