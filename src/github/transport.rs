//! HTTP transport for the hosting API
//!
//! The client never looks at reqwest types directly; it sees a drained
//! [`RawResponse`] or a [`TransportError`]. This keeps classification pure
//! and lets tests script responses.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;

/// Header carrying the remaining request quota
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Accept header selecting the structured JSON variant
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// A fully drained HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Value of the rate-limit-remaining header, if present
    pub rate_limit_remaining: Option<String>,
    pub content_type: Option<String>,
    /// Response body; `None` when draining the body failed
    pub body: Option<String>,
}

impl RawResponse {
    /// Convenience constructor for a response with a readable body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            rate_limit_remaining: None,
            content_type: None,
            body: Some(body.into()),
        }
    }

    pub fn with_json(mut self) -> Self {
        self.content_type = Some("application/json; charset=utf-8".to_string());
        self
    }

    pub fn with_rate_limit_remaining(mut self, remaining: impl Into<String>) -> Self {
        self.rate_limit_remaining = Some(remaining.into());
        self
    }

    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }
}

/// Failures below HTTP status level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),
}

/// Executes single HTTP requests against the hosting API
///
/// Implementations make exactly one attempt per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, method: Method, url: &str) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport carrying the credential headers
pub struct ReqwestTransport {
    client: reqwest::Client,
    token: String,
}

impl ReqwestTransport {
    /// Create a new transport with a bounded per-request timeout
    pub fn new(token: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created hosting API transport (timeout: {:?})", timeout);

        Ok(Self {
            client,
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, method: Method, url: &str) -> Result<RawResponse, TransportError> {
        tracing::debug!("{} {}", method, url);

        let mut req = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, GITHUB_ACCEPT);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        if method == Method::PUT {
            req = req.header(CONTENT_LENGTH, 0);
        }

        let resp = req.send().await.map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let rate_limit_remaining = header_string(&resp, RATE_LIMIT_REMAINING);
        let content_type = header_string(&resp, CONTENT_TYPE.as_str());

        let body = match resp.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Failed to read response body from {}: {}", url, e);
                None
            }
        };

        Ok(RawResponse {
            status,
            rate_limit_remaining,
            content_type,
            body,
        })
    }
}

fn header_string(resp: &reqwest::Response, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}
