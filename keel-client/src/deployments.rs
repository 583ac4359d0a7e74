//! Deployment history endpoints

use uuid::Uuid;

use crate::error::Result;
use crate::KeelClient;
use keel_core::domain::deployment::Deployment;

impl KeelClient {
    // =============================================================================
    // Deployment History
    // =============================================================================

    /// List deployments of an application, newest first
    ///
    /// # Arguments
    /// * `app` - The application name
    /// * `env` - Only return deployments to this environment
    pub async fn list_deployments(&self, app: &str, env: Option<&str>) -> Result<Vec<Deployment>> {
        let url = self.url(&["api", "apps", app, "deployments"])?;
        let mut request = self.client.get(url);
        if let Some(env) = env {
            request = request.query(&[("env", env)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Get a deployment by ID
    pub async fn get_deployment(&self, id: Uuid) -> Result<Deployment> {
        let id = id.to_string();
        let url = self.url(&["api", "deployments", &id])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
