//! Repository hosting API client
//!
//! Credential verification, repository lookup, and the star operations.
//! Each call makes exactly one attempt; retry policy belongs to the caller.

use super::classify::{classify_response, classify_transport, ApiResponse};
use super::repo_url::parse_repo_url;
use super::transport::{HttpTransport, ReqwestTransport};
use super::{ErrorKind, HostingError, HostingResult};
use crate::catalog::PluginRecord;
use crate::config::schema::GithubConfig;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Account behind the configured credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub login: String,
    pub name: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
}

/// Repository metadata as returned by the hosting API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub private: bool,
}

/// Outcome of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub endpoint: String,
    pub success: bool,
    pub latency: Duration,
    pub error: Option<String>,
}

/// Client for the repository hosting API
#[derive(Clone)]
pub struct RepositoryClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    max_retries: u32,
}

impl RepositoryClient {
    /// Create a client over an arbitrary transport
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, max_retries: u32) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        }
    }

    /// Create a reqwest-backed client from configuration
    pub fn from_config(config: &GithubConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(
            &config.token,
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(
            Arc::new(transport),
            &config.api_base_url,
            config.max_retries,
        ))
    }

    /// API base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured retry count for caller-level retry policies
    ///
    /// The client itself never retries.
    pub fn retry_budget(&self) -> u32 {
        self.max_retries
    }

    async fn call(&self, method: Method, path: &str) -> HostingResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        match self.transport.execute(method, &url).await {
            Ok(resp) => classify_response(resp),
            Err(e) => Err(classify_transport(e)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> HostingResult<T> {
        let value = self
            .call(Method::GET, path)
            .await?
            .into_json()
            .ok_or_else(|| HostingError::network(None, format!("empty response from {}", path)))?;

        serde_json::from_value(value)
            .map_err(|e| HostingError::network(None, format!("unexpected payload from {}: {}", path, e)))
    }

    /// Look up the account behind the credential
    pub async fn fetch_identity(&self) -> HostingResult<Identity> {
        self.get_json("/user").await
    }

    /// Check the credential with a lightweight identity lookup
    ///
    /// Every classified failure maps to `false` and is logged by kind.
    pub async fn verify_credential(&self) -> bool {
        match self.fetch_identity().await {
            Ok(identity) => {
                tracing::info!("Credential verified for account {}", identity.login);
                true
            }
            Err(e) => {
                tracing::error!("Credential verification failed ({}): {}", e.kind(), e);
                false
            }
        }
    }

    /// Fetch repository metadata
    pub async fn fetch_repository(&self, owner: &str, name: &str) -> HostingResult<RepositoryInfo> {
        self.get_json(&format!("/repos/{}/{}", owner, name)).await
    }

    /// Star a repository
    ///
    /// The outcome is binary; the failure kind only reaches the log. Use
    /// [`is_starred`](Self::is_starred) to learn why a repository is not starred.
    pub async fn set_starred(&self, owner: &str, name: &str) -> bool {
        match self
            .call(Method::PUT, &format!("/user/starred/{}/{}", owner, name))
            .await
        {
            Ok(_) => {
                tracing::info!("Starred {}/{}", owner, name);
                true
            }
            Err(e) => {
                tracing::error!("Failed to star {}/{} ({}): {}", owner, name, e.kind(), e);
                false
            }
        }
    }

    /// Tri-state star check
    ///
    /// - `Ok(true)`: the account has starred the repository
    /// - `Err(HostingError::NotStarred)`: the repository exists but is not starred
    /// - `Err(HostingError::NotFound(_))`: the repository is missing or inaccessible
    ///
    /// Any other failure is returned with its original kind.
    pub async fn is_starred(&self, owner: &str, name: &str) -> HostingResult<bool> {
        // Existence first: a 404 from the star endpoint is only meaningful
        // once the repository is known to exist. Any 2xx counts, body or not.
        self.call(Method::GET, &format!("/repos/{}/{}", owner, name))
            .await?;

        match self
            .call(Method::GET, &format!("/user/starred/{}/{}", owner, name))
            .await
        {
            Ok(_) => Ok(true),
            Err(HostingError::NotFound(_)) => Err(HostingError::NotStarred),
            Err(e) => {
                if e.kind() == ErrorKind::NetworkFailure {
                    tracing::warn!("Network failure checking star status of {}/{}: {}", owner, name, e);
                }
                Err(e)
            }
        }
    }

    /// Probe the rate-limit endpoint and report reachability and latency
    pub async fn probe_connectivity(&self) -> ConnectivityReport {
        let start = Instant::now();
        let result = self.call(Method::GET, "/rate_limit").await;
        let latency = start.elapsed();

        ConnectivityReport {
            endpoint: self.base_url.clone(),
            success: result.is_ok(),
            latency,
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Refresh a record's star count from live repository metadata
    ///
    /// Keeps the previous count when the URL is unresolvable or the lookup fails.
    pub async fn refresh_star_count(&self, record: &mut PluginRecord) {
        let Some(repo) = parse_repo_url(&record.repo_url) else {
            tracing::debug!("Cannot resolve repository for {}: {}", record.name, record.repo_url);
            return;
        };

        match self.fetch_repository(&repo.owner, &repo.name).await {
            Ok(info) => {
                record.stars = info.stargazers_count;
                tracing::debug!("Updated star count of {}: {}", record.name, record.stars);
            }
            Err(e) => {
                tracing::debug!("Failed to refresh star count of {} ({}): {}", record.name, e.kind(), e);
            }
        }
    }
}
