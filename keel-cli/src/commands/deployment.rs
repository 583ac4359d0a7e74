//! Deployment history command handlers

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use colored::*;

use super::lifecycle::{Lifecycle, Session, resolved, run};
use super::select::{ask_app, validate_app, validate_env};
use crate::id_resolver::{IdOrPrefix, resolve_deployment_id};
use crate::output::{print_deployment_details, print_deployment_summary, print_json};

/// Deployment subcommands
#[derive(Subcommand)]
pub enum DeploymentCommands {
    /// List deployments, newest first
    Ls(DeploymentListVars),
    /// Show a deployment
    Show(DeploymentShowVars),
}

#[derive(Args, Debug, Clone)]
pub struct DeploymentListVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Only deployments of this environment
    #[arg(short, long)]
    pub env: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeploymentShowVars {
    /// Deployment ID or unambiguous prefix
    pub id: String,

    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Handle deployment commands
pub async fn handle_deployment_command(command: DeploymentCommands, session: Session) -> Result<()> {
    match command {
        DeploymentCommands::Ls(vars) => {
            run(DeploymentListOpts {
                vars,
                session,
                app: None,
            })
            .await
        }
        DeploymentCommands::Show(vars) => {
            run(DeploymentShowOpts {
                vars,
                session,
                app: None,
            })
            .await
        }
    }
}

pub struct DeploymentListOpts {
    vars: DeploymentListVars,
    session: Session,
    app: Option<String>,
}

#[async_trait]
impl Lifecycle for DeploymentListOpts {
    fn name(&self) -> &'static str {
        "deployment ls"
    }

    async fn validate(&mut self) -> Result<()> {
        if let Some(app) = &self.vars.app {
            self.app = Some(validate_app(&self.session, app).await?);
            if let Some(env) = &self.vars.env {
                validate_env(&self.session, app, env).await?;
            }
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.app.is_none() {
            self.app = Some(ask_app(&self.session).await?);
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let app = resolved(&self.app, "application")?;
        let mut deployments = self
            .session
            .store
            .deployments(app, self.vars.env.as_deref())
            .await
            .with_context(|| format!("Failed to list deployments of '{}'", app))?;
        deployments.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        if self.vars.json {
            return print_json(&deployments);
        }

        if deployments.is_empty() {
            println!("{}", "No deployments found.".yellow());
        } else {
            println!(
                "{}",
                format!("Found {} deployment(s):", deployments.len()).bold()
            );
            println!();
            for deployment in &deployments {
                print_deployment_summary(deployment);
            }
        }

        Ok(())
    }
}

pub struct DeploymentShowOpts {
    vars: DeploymentShowVars,
    session: Session,
    app: Option<String>,
}

#[async_trait]
impl Lifecycle for DeploymentShowOpts {
    fn name(&self) -> &'static str {
        "deployment show"
    }

    async fn validate(&mut self) -> Result<()> {
        if let Some(app) = &self.vars.app {
            self.app = Some(validate_app(&self.session, app).await?);
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.app.is_none() {
            self.app = Some(ask_app(&self.session).await?);
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let app = resolved(&self.app, "application")?;
        let id_or_prefix = IdOrPrefix::parse(&self.vars.id);
        let id = resolve_deployment_id(self.session.store.as_ref(), app, None, &id_or_prefix).await?;

        let deployment = self
            .session
            .store
            .deployment(id)
            .await
            .with_context(|| format!("Failed to get deployment {}", id))?;

        if self.vars.json {
            return print_json(&deployment);
        }
        print_deployment_details(&deployment);

        Ok(())
    }
}
