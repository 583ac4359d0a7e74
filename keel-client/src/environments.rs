//! Environment endpoints

use crate::error::Result;
use crate::KeelClient;
use keel_core::domain::deployment::Deployment;
use keel_core::domain::environment::Environment;
use keel_core::dto::environment::DeployEnvironmentRequest;

impl KeelClient {
    // =============================================================================
    // Environments
    // =============================================================================

    /// List the environments of an application
    pub async fn list_environments(&self, app: &str) -> Result<Vec<Environment>> {
        let url = self.url(&["api", "apps", app, "envs"])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Get one environment of an application
    pub async fn get_environment(&self, app: &str, env: &str) -> Result<Environment> {
        let url = self.url(&["api", "apps", app, "envs", env])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Deploy the shared infrastructure of an environment
    ///
    /// The control plane answers 409 when the stack is already up to date.
    ///
    /// # Arguments
    /// * `app` - The application name
    /// * `env` - The environment name
    /// * `req` - Deploy options
    ///
    /// # Returns
    /// The deployment record
    pub async fn deploy_environment(
        &self,
        app: &str,
        env: &str,
        req: &DeployEnvironmentRequest,
    ) -> Result<Deployment> {
        let url = self.url(&["api", "apps", app, "envs", env, "deploy"])?;
        tracing::debug!(app, env, force = req.force, "deploying environment");
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }
}
