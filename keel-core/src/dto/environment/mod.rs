//! Environment DTOs

use serde::{Deserialize, Serialize};

/// Request to deploy the shared infrastructure of an environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployEnvironmentRequest {
    /// Redeploy even if the stack template did not change
    pub force: bool,
}
