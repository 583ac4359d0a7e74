//! Command lifecycle
//!
//! Every subcommand is split in two parts:
//! - `*Vars`: the clap argument struct, exactly what the user typed
//! - `*Opts`: the vars plus the session and whatever was resolved from them
//!
//! Opts implement [`Lifecycle`] and are driven by [`run`]: `validate` checks
//! the flags that were given, `ask` fills in the missing ones (prompting if
//! allowed) and `execute` does the work.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::prompt::Prompter;
use crate::workspace::Workspace;
use keel_client::{ConfigStore, Deployer};

/// Collaborators shared by all commands of one invocation
#[derive(Clone)]
pub struct Session {
    pub config: Config,
    pub store: Arc<dyn ConfigStore>,
    pub deployer: Arc<dyn Deployer>,
    pub prompter: Arc<dyn Prompter>,
    /// Local workspace, if the command runs inside one
    pub workspace: Option<Workspace>,
}

/// The three phases of a command
#[async_trait]
pub trait Lifecycle: Send {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Check the values passed as flags
    async fn validate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Resolve values that were not passed as flags
    async fn ask(&mut self) -> Result<()> {
        Ok(())
    }

    /// Perform the command
    async fn execute(&mut self) -> Result<()>;
}

/// Run a command through validate, ask and execute
///
/// Stops at the first phase that fails.
pub async fn run<C: Lifecycle>(mut command: C) -> Result<()> {
    let name = command.name();

    debug!(command = name, "validating");
    command.validate().await?;

    debug!(command = name, "asking");
    command.ask().await?;

    debug!(command = name, "executing");
    command.execute().await
}

/// Unwrap a value that `ask` is expected to have resolved
pub fn resolved<'a, T>(value: &'a Option<T>, what: &str) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| anyhow!("{} was not resolved before execute", what))
}
