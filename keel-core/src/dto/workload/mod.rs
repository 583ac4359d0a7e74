//! Workload DTOs
//!
//! Data transfer objects for workload listing and deployment.

use serde::{Deserialize, Serialize};

use crate::domain::workload::{Workload, WorkloadKind};

/// Catalog entry for a workload: its name and declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: WorkloadKind,
}

impl From<Workload> for WorkloadSummary {
    fn from(workload: Workload) -> Self {
        WorkloadSummary {
            name: workload.name,
            kind: workload.kind,
        }
    }
}

/// Request to deploy a workload into an environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployWorkloadRequest {
    /// Raw manifest from the local workspace, if one was found
    pub manifest: Option<String>,

    /// Container image tag to deploy
    pub image_tag: Option<String>,

    /// Redeploy even if nothing changed
    pub force: bool,
}
