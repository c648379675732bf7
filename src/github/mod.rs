// Hosting platform client for starcat
//
// Talks to the GitHub REST API and turns every response into either a
// success payload or one variant of a closed failure taxonomy.

pub mod classify;
pub mod client;
pub mod repo_url;
pub mod transport;

pub use classify::{classify_response, ApiResponse};
pub use client::{ConnectivityReport, Identity, RepositoryClient, RepositoryInfo};
pub use repo_url::{parse_repo_url, RepoRef};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportError};

use std::fmt;

/// Hosting API failures
///
/// Classified once at the transport boundary and carried unchanged through
/// every higher-level call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostingError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("insufficient permission: {0}")]
    Permission(String),

    #[error("repository not found or inaccessible: {0}")]
    NotFound(String),

    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("repository exists but is not starred")]
    NotStarred,

    #[error("network failure: {detail}")]
    Network { status: Option<u16>, detail: String },
}

impl HostingError {
    /// The fieldless kind of this failure, for branching and logging
    pub fn kind(&self) -> ErrorKind {
        match self {
            HostingError::Authentication(_) => ErrorKind::AuthenticationFailure,
            HostingError::Permission(_) => ErrorKind::PermissionFailure,
            HostingError::NotFound(_) => ErrorKind::NotFound,
            HostingError::RateLimited(_) => ErrorKind::RateLimitFailure,
            HostingError::NotStarred => ErrorKind::NotStarred,
            HostingError::Network { .. } => ErrorKind::NetworkFailure,
        }
    }

    pub(crate) fn network(status: Option<u16>, detail: impl Into<String>) -> Self {
        HostingError::Network {
            status,
            detail: detail.into(),
        }
    }
}

/// Failure kinds of the hosting API taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthenticationFailure,
    PermissionFailure,
    NotFound,
    RateLimitFailure,
    NotStarred,
    NetworkFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailure => "authentication",
            ErrorKind::PermissionFailure => "permission",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimitFailure => "rate_limit",
            ErrorKind::NotStarred => "not_starred",
            ErrorKind::NetworkFailure => "network",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for hosting API operations
pub type HostingResult<T> = Result<T, HostingError>;
