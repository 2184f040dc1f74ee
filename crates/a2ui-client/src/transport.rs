//! Transport collaborators.
//!
//! The runtime only needs two things from the network: a way to send one
//! [`ClientRequest`] and a [`ChunkSource`] that yields the response body
//! chunk by chunk. Connection setup, retries, and headers live here and
//! nowhere else.

use std::collections::VecDeque;
use std::time::Duration;

use a2ui_core::config::Config;
use a2ui_core::error::{A2uiError, Result};
use a2ui_core::protocol::ClientRequest;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

/// Yields the next chunk of a streamed body, or `None` at end of stream.
#[async_trait]
pub trait ChunkSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        self.chunk()
            .await
            .map_err(|e| A2uiError::Transport(format!("stream read failed: {e}")))
    }
}

/// In-memory body, used for replaying captured streams.
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Bytes>,
}

impl MemorySource {
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Cut `data` into chunks of at most `chunk_size` bytes, ignoring line
    /// boundaries the way a network would.
    pub fn split(data: &[u8], chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self::from_chunks(data.chunks(chunk_size).map(Bytes::copy_from_slice))
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.chunks.pop_front())
    }
}

/// Sends one request and hands back the streamed response body.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    async fn send(&self, request: &ClientRequest) -> Result<Box<dyn ChunkSource>>;
}

/// POSTs requests as JSON to the agent endpoint over HTTP.
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::build(url.into(), None, Vec::new())
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            config.server_url(),
            config.request_timeout(),
            config.headers().into_iter().collect(),
        )
    }

    fn build(url: String, timeout: Option<Duration>, headers: Vec<(String, String)>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| A2uiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url,
            client,
            headers,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RequestTransport for HttpTransport {
    async fn send(&self, request: &ClientRequest) -> Result<Box<dyn ChunkSource>> {
        let mut req_builder = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream");
        for (name, value) in &self.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        debug!(url = %self.url, surface_id = ?request.surface_id, "Sending request");
        let response = req_builder
            .json(request)
            .send()
            .await
            .map_err(|e| A2uiError::Transport(format!("request to {} failed: {e}", self.url)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(A2uiError::Transport(format!("server returned {status}: {body}")));
        }

        info!(url = %self.url, status = %response.status(), "Stream opened");
        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_drains_in_order() {
        let mut source = MemorySource::split(b"abcdefg", 3);
        let mut seen = Vec::new();
        while let Some(chunk) = source.next_chunk().await.unwrap() {
            seen.push(chunk);
        }
        assert_eq!(seen, [Bytes::from("abc"), Bytes::from("def"), Bytes::from("g")]);
    }

    #[test]
    fn test_transport_from_config_uses_server_url() {
        let config = Config::parse(r#"{ server: { url: "http://127.0.0.1:9/a2ui", timeout_secs: 5 } }"#)
            .unwrap();
        let transport = HttpTransport::from_config(&config).unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:9/a2ui");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(format!("http://127.0.0.1:{port}/a2ui")).unwrap();
        let result = transport.send(&ClientRequest::prompt("hi", None)).await;
        assert!(matches!(result, Err(A2uiError::Transport(_))));
    }
}
