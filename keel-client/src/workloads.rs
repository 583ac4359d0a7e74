//! Workload endpoints

use crate::error::Result;
use crate::KeelClient;
use keel_core::domain::deployment::Deployment;
use keel_core::domain::workload::{Workload, WorkloadStatus};
use keel_core::dto::workload::DeployWorkloadRequest;

impl KeelClient {
    // =============================================================================
    // Workloads
    // =============================================================================

    /// List the workloads registered for an application
    pub async fn list_workloads(&self, app: &str) -> Result<Vec<Workload>> {
        let url = self.url(&["api", "apps", app, "workloads"])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Get a workload by name
    pub async fn get_workload(&self, app: &str, name: &str) -> Result<Workload> {
        let url = self.url(&["api", "apps", app, "workloads", name])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Deploy a workload into an environment
    ///
    /// The control plane answers 409 when nothing changed.
    ///
    /// # Arguments
    /// * `app` - The application name
    /// * `env` - The target environment
    /// * `name` - The workload name
    /// * `req` - Manifest, image tag and force flag
    ///
    /// # Returns
    /// The deployment record
    pub async fn deploy_workload(
        &self,
        app: &str,
        env: &str,
        name: &str,
        req: &DeployWorkloadRequest,
    ) -> Result<Deployment> {
        let url = self.url(&["api", "apps", app, "envs", env, "workloads", name, "deploy"])?;
        tracing::debug!(app, env, workload = name, "deploying workload");
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the runtime status of a workload in one environment
    pub async fn workload_status(&self, app: &str, env: &str, name: &str) -> Result<WorkloadStatus> {
        let url = self.url(&["api", "apps", app, "envs", env, "workloads", name, "status"])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
