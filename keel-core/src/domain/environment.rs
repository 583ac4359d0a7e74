//! Environment domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployment stage of an application (test, staging, prod, ...)
///
/// Environments own the shared infrastructure (network, cluster) that
/// workloads are deployed into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub app: String,
    pub name: String,
    pub region: String,
    pub account_id: Option<String>,
    #[serde(default)]
    pub production: bool,
    pub created_at: DateTime<Utc>,
}
