//! Deploy order errors

use thiserror::Error;

/// Errors raised while resolving the deployment order
#[derive(Debug, Error)]
pub enum OrderError {
    /// A `/N` suffix is not a non-negative integer, or is out of range
    #[error("invalid deploy order tag '{token}': {reason}")]
    InvalidOrderTag { token: String, reason: String },

    /// The same workload was given two different order tags
    #[error("workload '{name}' has conflicting deploy order tags '{first}' and '{second}'")]
    ConflictingOrderTag {
        name: String,
        first: String,
        second: String,
    },

    /// Nothing left to deploy after resolution
    #[error("no workloads selected for deployment, name at least one workload or use --all")]
    EmptyWorkloadSet,

    /// The workload catalog could not be read
    #[error("retrieve store workloads for application '{app}'")]
    CatalogUnavailable {
        app: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl OrderError {
    pub(crate) fn invalid_tag(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOrderTag {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
