//! Application endpoints

use crate::error::Result;
use crate::KeelClient;
use keel_core::domain::application::Application;

impl KeelClient {
    // =============================================================================
    // Applications
    // =============================================================================

    /// List all applications
    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        let response = self.client.get(self.url(&["api", "apps"])?).send().await?;

        self.handle_response(response).await
    }

    /// Get an application by name
    ///
    /// # Arguments
    /// * `app` - The application name
    pub async fn get_application(&self, app: &str) -> Result<Application> {
        let url = self.url(&["api", "apps", app])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
