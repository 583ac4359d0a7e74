//! ID resolver module
//!
//! Lets users name a deployment by an unambiguous prefix of its UUID, the
//! way they would a git commit.

use anyhow::{Context, Result, anyhow};
use uuid::Uuid;

use keel_client::ConfigStore;

/// Identifier that can be either a full UUID or an unambiguous prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    /// Parse as a full UUID first, otherwise keep the lowercased input as a prefix
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }
}

/// Resolve a deployment ID or prefix to a full UUID
///
/// Prefixes are matched against the deployment history of `app`, optionally
/// restricted to `env`.
///
/// # Errors
/// Returns an error if:
/// - No deployment matches the prefix
/// - Multiple deployments match the prefix (ambiguous)
/// - API call fails
pub async fn resolve_deployment_id(
    store: &dyn ConfigStore,
    app: &str,
    env: Option<&str>,
    id_or_prefix: &IdOrPrefix,
) -> Result<Uuid> {
    let prefix = match id_or_prefix {
        IdOrPrefix::Full(uuid) => return Ok(*uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };
    if prefix.is_empty() {
        return Err(anyhow!("Deployment ID cannot be empty"));
    }

    let deployments = store
        .deployments(app, env)
        .await
        .context("Failed to fetch deployments for ID resolution")?;

    let matches: Vec<Uuid> = deployments
        .iter()
        .map(|d| d.id)
        .filter(|id| id.to_string().starts_with(prefix.as_str()))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No deployment found with ID starting with '{}'",
            prefix
        )),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple deployments: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
