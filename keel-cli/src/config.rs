//! Configuration module
//!
//! Settings shared by every command of one invocation. Built once in `main`
//! from global flags and environment variables, then handed to commands by
//! reference through the session.

use anyhow::Result;
use keel_core::order::DEFAULT_MAX_ORDINAL;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the control plane API
    pub api_url: String,

    /// Largest accepted deploy order tag (`name/N`)
    pub max_deploy_order: u32,

    /// Whether missing values may be asked for interactively
    pub prompt: bool,
}

impl Config {
    /// Creates a configuration with defaults for everything but the URL
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            max_deploy_order: DEFAULT_MAX_ORDINAL,
            prompt: true,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.max_deploy_order == 0 {
            anyhow::bail!("max_deploy_order must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
