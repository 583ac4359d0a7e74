//! Deployment domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of one deployment of an environment or a workload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub app: String,
    pub env: String,
    /// `None` when the environment itself was deployed
    pub workload: Option<String>,
    pub status: DeploymentStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl Deployment {
    /// Name of what was deployed, `env` or `env/workload`
    pub fn target(&self) -> String {
        match &self.workload {
            Some(workload) => format!("{}/{}", self.env, workload),
            None => self.env.clone(),
        }
    }
}

/// Deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    InProgress,
    Succeeded,
    Failed,
    /// The stack was already up to date
    NoChanges,
    RolledBack,
}

impl DeploymentStatus {
    /// Whether the deployment has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::InProgress)
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentStatus::InProgress => write!(f, "In progress"),
            DeploymentStatus::Succeeded => write!(f, "Succeeded"),
            DeploymentStatus::Failed => write!(f, "Failed"),
            DeploymentStatus::NoChanges => write!(f, "No changes"),
            DeploymentStatus::RolledBack => write!(f, "Rolled back"),
        }
    }
}
