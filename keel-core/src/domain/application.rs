//! Application domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An application groups environments and the workloads deployed into them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}
