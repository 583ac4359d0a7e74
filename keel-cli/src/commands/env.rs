//! Environment command handlers

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use colored::*;
use tracing::info;

use super::lifecycle::{Lifecycle, Session, resolved, run};
use super::select::{ask_app, ask_env, confirm_production, validate_app, validate_env};
use crate::output::{colorize_status, format_time, print_json};
use keel_core::domain::environment::Environment;
use keel_core::dto::environment::DeployEnvironmentRequest;

/// Environment subcommands
#[derive(Subcommand)]
pub enum EnvCommands {
    /// List environments of an application
    Ls(EnvListVars),
    /// Show an environment
    Show(EnvShowVars),
    /// Deploy the shared infrastructure of an environment
    Deploy(EnvDeployVars),
}

#[derive(Args, Debug, Clone)]
pub struct EnvListVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EnvShowVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Environment name
    #[arg(short, long, env = "KEEL_ENV")]
    pub name: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EnvDeployVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Environment name
    #[arg(short, long, env = "KEEL_ENV")]
    pub name: Option<String>,

    /// Redeploy even if the stack did not change
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation for production environments
    #[arg(short, long)]
    pub yes: bool,
}

/// Handle environment commands
pub async fn handle_env_command(command: EnvCommands, session: Session) -> Result<()> {
    match command {
        EnvCommands::Ls(vars) => {
            run(EnvListOpts {
                vars,
                session,
                app: None,
            })
            .await
        }
        EnvCommands::Show(vars) => {
            let target = EnvTarget::new(vars.app.clone(), vars.name.clone());
            run(EnvShowOpts {
                vars,
                session,
                target,
            })
            .await
        }
        EnvCommands::Deploy(vars) => {
            let target = EnvTarget::new(vars.app.clone(), vars.name.clone());
            run(EnvDeployOpts {
                vars,
                session,
                target,
            })
            .await
        }
    }
}

/// Application and environment flags plus what they resolved to
struct EnvTarget {
    app_flag: Option<String>,
    env_flag: Option<String>,
    app: Option<String>,
    env: Option<Environment>,
}

impl EnvTarget {
    fn new(app_flag: Option<String>, env_flag: Option<String>) -> Self {
        Self {
            app_flag,
            env_flag,
            app: None,
            env: None,
        }
    }

    async fn validate(&mut self, session: &Session) -> Result<()> {
        if let Some(app) = &self.app_flag {
            self.app = Some(validate_app(session, app).await?);
            if let Some(env) = &self.env_flag {
                self.env = Some(validate_env(session, app, env).await?);
            }
        }
        Ok(())
    }

    async fn ask(&mut self, session: &Session) -> Result<()> {
        if self.app.is_none() {
            self.app = Some(ask_app(session).await?);
        }
        let app = resolved(&self.app, "application")?;

        if self.env.is_none() {
            self.env = Some(match &self.env_flag {
                Some(env) => validate_env(session, app, env).await?,
                None => ask_env(session, app).await?,
            });
        }
        Ok(())
    }

    fn resolved(&self) -> Result<(&str, &Environment)> {
        Ok((
            resolved(&self.app, "application")?,
            resolved(&self.env, "environment")?,
        ))
    }
}

pub struct EnvListOpts {
    vars: EnvListVars,
    session: Session,
    app: Option<String>,
}

#[async_trait]
impl Lifecycle for EnvListOpts {
    fn name(&self) -> &'static str {
        "env ls"
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
        let envs = self
            .session
            .store
            .environments(app)
            .await
            .with_context(|| format!("Failed to list environments of '{}'", app))?;

        if self.vars.json {
            return print_json(&envs);
        }

        if envs.is_empty() {
            println!("{}", format!("No environments found in '{}'.", app).yellow());
        } else {
            println!("{}", format!("Found {} environment(s):", envs.len()).bold());
            println!();
            for env in &envs {
                print_environment_summary(env);
            }
        }

        Ok(())
    }
}

pub struct EnvShowOpts {
    vars: EnvShowVars,
    session: Session,
    target: EnvTarget,
}

#[async_trait]
impl Lifecycle for EnvShowOpts {
    fn name(&self) -> &'static str {
        "env show"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await
    }

    async fn execute(&mut self) -> Result<()> {
        let (app, env) = self.target.resolved()?;
        let deployments = self
            .session
            .store
            .deployments(app, Some(&env.name))
            .await
            .with_context(|| format!("Failed to list deployments of '{}'", env.name))?;
        let last = deployments.iter().max_by_key(|d| d.started_at);

        if self.vars.json {
            return print_json(&serde_json::json!({
                "environment": env,
                "last_deployment": last,
            }));
        }

        println!("{}", "Environment Details:".bold());
        println!("  Application: {}", env.app);
        println!("  Name:        {}", env.name.bold());
        println!("  Region:      {}", env.region);
        if let Some(account) = &env.account_id {
            println!("  Account:     {}", account);
        }
        println!(
            "  Production:  {}",
            if env.production { "yes".red() } else { "no".normal() }
        );
        println!("  Created:     {}", format_time(&env.created_at));
        if let Some(last) = last {
            println!(
                "  Last deploy: {} {} {}",
                last.target(),
                colorize_status(&last.status),
                format_time(&last.started_at).dimmed()
            );
        }

        Ok(())
    }
}

pub struct EnvDeployOpts {
    vars: EnvDeployVars,
    session: Session,
    target: EnvTarget,
}

#[async_trait]
impl Lifecycle for EnvDeployOpts {
    fn name(&self) -> &'static str {
        "env deploy"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await?;
        let (_, env) = self.target.resolved()?;
        confirm_production(&self.session, env, self.vars.yes)
    }

    async fn execute(&mut self) -> Result<()> {
        let (app, env) = self.target.resolved()?;
        deploy_environment(&self.session, app, &env.name, self.vars.force).await
    }
}

/// Deploy `env`, treating an up to date stack as success
pub async fn deploy_environment(session: &Session, app: &str, env: &str, force: bool) -> Result<()> {
    info!(app, env, force, "deploying environment");
    let req = DeployEnvironmentRequest { force };

    match session.deployer.deploy_environment(app, env, &req).await {
        Ok(deployment) => {
            println!(
                "{} {}",
                "✓ Deployed environment".green().bold(),
                env.bold()
            );
            println!("  Deployment: {}", deployment.id.to_string().cyan());
            println!("  Status:     {}", colorize_status(&deployment.status));
            Ok(())
        }
        Err(err) if err.is_no_changes() => {
            info!(env, "environment already up to date");
            println!(
                "{}",
                format!("✓ No infrastructure changes for environment {}", env).green()
            );
            Ok(())
        }
        Err(err) => Err(err).context(format!("Failed to deploy environment '{}'", env)),
    }
}

fn print_environment_summary(env: &Environment) {
    let production = if env.production { " (production)" } else { "" };
    println!("  {} {}{}", "▸".cyan(), env.name.bold(), production.red());
    println!("    Region:  {}", env.region.dimmed());
    println!("    Created: {}", format_time(&env.created_at).dimmed());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{FakeStore, ScriptedPrompter, session};
    use crate::prompt::DisabledPrompter;
    use std::sync::Arc;

    fn deploy_opts(store: Arc<FakeStore>, prompter: ScriptedPrompter, yes: bool) -> EnvDeployOpts {
        EnvDeployOpts {
            vars: EnvDeployVars {
                app: Some("shop".to_string()),
                name: Some("prod".to_string()),
                force: false,
                yes,
            },
            session: session(store, prompter),
            target: EnvTarget::new(Some("shop".to_string()), Some("prod".to_string())),
        }
    }

    #[tokio::test]
    async fn test_deploy_no_changes_is_success() {
        let store = Arc::new(FakeStore::new("shop").with_env("prod", true).no_changes("prod"));
        run(deploy_opts(store.clone(), ScriptedPrompter::new(), true))
            .await
            .unwrap();
        assert_eq!(store.deployed(), vec!["prod"]);
    }

    #[tokio::test]
    async fn test_deploy_failure_is_reported() {
        let store = Arc::new(FakeStore::new("shop").with_env("prod", true).failing("prod"));
        let err = run(deploy_opts(store, ScriptedPrompter::new(), true))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to deploy environment 'prod'");
    }

    #[tokio::test]
    async fn test_declined_production_deploy_does_nothing() {
        let store = Arc::new(FakeStore::new("shop").with_env("prod", true));
        let result = run(deploy_opts(
            store.clone(),
            ScriptedPrompter::new().confirm(false),
            false,
        ))
        .await;
        assert!(result.is_err());
        assert!(store.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_env_flag_validated_after_asked_app() {
        let store = Arc::new(FakeStore::new("shop").with_env("test", false));
        let session = session(store, DisabledPrompter);
        let mut target = EnvTarget::new(None, Some("staging".to_string()));

        target.validate(&session).await.unwrap();
        let err = target.ask(&session).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "environment 'staging' does not exist in application 'shop'"
        );
    }
}
