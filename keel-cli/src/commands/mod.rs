//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod app;
mod deploy;
mod deployment;
mod env;
mod init;
pub mod lifecycle;
mod select;
mod workload;

#[cfg(test)]
pub(crate) mod testing;

pub use app::AppCommands;
pub use deploy::DeployVars;
pub use deployment::DeploymentCommands;
pub use env::EnvCommands;
pub use init::InitCommands;
pub use workload::WorkloadCommands;

use anyhow::Result;
use clap::Subcommand;

use deploy::DeployOpts;
use lifecycle::{Session, run};
use select::WorkloadFamily;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a workspace or scaffold workload manifests
    Init {
        #[command(subcommand)]
        command: InitCommands,
    },
    /// Application management
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
    /// Environment management
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Service management
    Svc {
        #[command(subcommand)]
        command: WorkloadCommands,
    },
    /// Job management
    Job {
        #[command(subcommand)]
        command: WorkloadCommands,
    },
    /// Deploy several workloads in order
    Deploy(DeployVars),
    /// Deployment history
    Deployment {
        #[command(subcommand)]
        command: DeploymentCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, session: Session) -> Result<()> {
    match command {
        Commands::Init { command } => init::handle_init_command(command, session).await,
        Commands::App { command } => app::handle_app_command(command, session).await,
        Commands::Env { command } => env::handle_env_command(command, session).await,
        Commands::Svc { command } => {
            workload::handle_workload_command(command, WorkloadFamily::Service, session).await
        }
        Commands::Job { command } => {
            workload::handle_workload_command(command, WorkloadFamily::Job, session).await
        }
        Commands::Deploy(vars) => run(DeployOpts::new(vars, session)).await,
        Commands::Deployment { command } => {
            deployment::handle_deployment_command(command, session).await
        }
    }
}
