//! Error types for the Keel client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Keel client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The base URL cannot carry endpoint paths
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if the control plane refused a deploy because nothing changed
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ApiError { status: 409, .. })
    }
}

/// Errors returned by deploy operations
///
/// A deploy that finds the stack already up to date is reported as
/// `NoChanges` so callers can match on it instead of inspecting status codes.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The target is already up to date
    #[error("no infrastructure changes for {target}")]
    NoChanges {
        target: String,
        #[source]
        source: ClientError,
    },

    /// The deploy failed
    #[error("deploy {target}")]
    Failed {
        target: String,
        #[source]
        source: ClientError,
    },
}

impl DeployError {
    /// Classify a client error raised while deploying `target`
    pub fn from_client(target: impl Into<String>, source: ClientError) -> Self {
        let target = target.into();
        if source.is_conflict() {
            Self::NoChanges { target, source }
        } else {
            Self::Failed { target, source }
        }
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges { .. })
    }

    /// The environment or `env/workload` that was being deployed
    pub fn target(&self) -> &str {
        match self {
            Self::NoChanges { target, .. } | Self::Failed { target, .. } => target,
        }
    }
}
