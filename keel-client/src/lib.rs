//! Keel HTTP Client
//!
//! A small, type-safe HTTP client for the Keel control plane, which owns the
//! configuration store (applications, environments, workloads) and performs
//! deployments.
//!
//! The CLI does not talk to [`KeelClient`] directly: it depends on the
//! [`ConfigStore`], [`WorkloadCatalog`] and [`Deployer`] traits, which the
//! client implements and tests replace with in-memory fakes.
//!
//! # Example
//!
//! ```no_run
//! use keel_client::KeelClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = KeelClient::new("http://localhost:8080");
//!
//!     for app in client.list_applications().await? {
//!         println!("{}", app.name);
//!     }
//!     Ok(())
//! }
//! ```

mod applications;
mod deployments;
mod environments;
pub mod error;
mod store;
mod workloads;

// Re-export commonly used types
pub use error::{ClientError, DeployError, Result};
pub use store::{ConfigStore, Deployer, WorkloadCatalog};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the Keel control plane API
///
/// Endpoints are grouped by resource:
/// - Applications (list, get)
/// - Environments (list, get, deploy)
/// - Workloads (list, get, deploy, status)
/// - Deployment history
#[derive(Debug, Clone)]
pub struct KeelClient {
    /// Base URL of the control plane (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl KeelClient {
    /// Create a new control plane client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the control plane API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use keel_client::KeelClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = KeelClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the control plane
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL by appending `segments` to the base URL
    ///
    /// Each segment is percent-encoded, so names cannot add path levels.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "control plane response");

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = KeelClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = KeelClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = KeelClient::with_client("http://localhost:8080", Client::new());
        assert_eq!(
            client.url(&["api", "apps"]).unwrap().as_str(),
            "http://localhost:8080/api/apps"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = KeelClient::new("http://localhost:8080/");
        let url = client.url(&["api", "apps", "my-app_1.0", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/apps/my-app_1.0/a%2Fb%20c"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = KeelClient::new("https://ops.example.com/keel");
        let url = client.url(&["api", "apps"]).unwrap();
        assert_eq!(url.as_str(), "https://ops.example.com/keel/api/apps");
    }

    #[test]
    fn test_url_rejects_invalid_base() {
        let client = KeelClient::new("localhost:8080");
        assert!(matches!(
            client.url(&["api"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
