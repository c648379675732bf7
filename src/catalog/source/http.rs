//! HTTP mirror source

use super::connector::MirrorSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP(S) mirror of the plugin index
pub struct HttpMirror {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMirror {
    /// Create a new HTTP mirror
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created HTTP mirror for: {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl MirrorSource for HttpMirror {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Fetching index from: {}", self.endpoint);

        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .with_context(|| format!("Failed to fetch from: {}", self.endpoint))?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "HTTP request failed: {} (status: {})",
                self.endpoint,
                resp.status()
            );
        }

        // Read as text: mirrors do not reliably send a JSON content type
        let text = resp
            .text()
            .await
            .with_context(|| format!("Failed to read body from: {}", self.endpoint))?;

        tracing::debug!("Fetched {} bytes from: {}", text.len(), self.endpoint);

        Ok(text)
    }

    fn location(&self) -> String {
        self.endpoint.clone()
    }
}
