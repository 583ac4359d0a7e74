//! Keel CLI
//!
//! Command-line interface for deploying applications through the Keel
//! control plane.

mod commands;
mod config;
mod id_resolver;
mod output;
mod prompt;
mod workspace;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::lifecycle::Session;
use commands::{Commands, handle_command};
use config::Config;
use keel_client::KeelClient;
use keel_core::order::DEFAULT_MAX_ORDINAL;
use prompt::{DisabledPrompter, Prompter, TerminalPrompter};
use workspace::{Workspace, WorkspaceError};

#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Deploy containerized applications", long_about = None)]
#[command(version)]
struct Cli {
    /// Control plane URL
    #[arg(
        long,
        global = true,
        env = "KEEL_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Never prompt, fail on missing flags instead
    #[arg(long, global = true, env = "KEEL_NO_PROMPT")]
    no_prompt: bool,

    /// Largest accepted deploy order tag
    #[arg(
        long,
        global = true,
        env = "KEEL_MAX_DEPLOY_ORDER",
        default_value_t = DEFAULT_MAX_ORDINAL
    )]
    max_deploy_order: u32,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Log to stderr, `RUST_LOG` overriding the verbosity flag
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default = format!("keel={level},keel_client={level},keel_core={level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config {
        api_url: cli.api_url,
        max_deploy_order: cli.max_deploy_order,
        prompt: !cli.no_prompt && std::io::stdin().is_terminal(),
    };
    config.validate().context("Invalid configuration")?;
    debug!(?config, "configuration loaded");

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let workspace = match Workspace::discover(&cwd) {
        Ok(workspace) => Some(workspace),
        Err(WorkspaceError::NotFound(_)) => None,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable workspace");
            None
        }
    };

    let prompter: Arc<dyn Prompter> = if config.prompt {
        Arc::new(TerminalPrompter::new())
    } else {
        Arc::new(DisabledPrompter)
    };
    let client = Arc::new(KeelClient::new(&config.api_url));

    let session = Session {
        config,
        store: client.clone(),
        deployer: client,
        prompter,
        workspace,
    };

    handle_command(cli.command, session).await
}
