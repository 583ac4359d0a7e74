//! Service and job command handlers
//!
//! `keel svc` and `keel job` share their subcommands, the family only
//! decides which workload kinds are listed and accepted.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use colored::*;
use tracing::{debug, info};

use super::lifecycle::{Lifecycle, Session, resolved, run};
use super::select::{
    WorkloadFamily, ask_app, ask_env, ask_workload, confirm_production, validate_app, validate_env,
    validate_workload,
};
use crate::output::{colorize_status, format_time, print_json};
use keel_core::domain::environment::Environment;
use keel_core::domain::workload::Workload;
use keel_core::dto::workload::{DeployWorkloadRequest, WorkloadSummary};

/// Workload subcommands
#[derive(Subcommand)]
pub enum WorkloadCommands {
    /// List workloads of an application
    Ls(WorkloadListVars),
    /// Show a workload
    Show(WorkloadShowVars),
    /// Deploy a workload into an environment
    Deploy(WorkloadDeployVars),
    /// Show the running state of a workload in an environment
    Status(WorkloadStatusVars),
}

#[derive(Args, Debug, Clone)]
pub struct WorkloadListVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WorkloadShowVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Workload name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WorkloadDeployVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Workload name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Environment name
    #[arg(short, long, env = "KEEL_ENV")]
    pub env: Option<String>,

    /// Container image tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Redeploy even if nothing changed
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation for production environments
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WorkloadStatusVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Workload name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Environment name
    #[arg(short, long, env = "KEEL_ENV")]
    pub env: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Handle `svc` and `job` commands
pub async fn handle_workload_command(
    command: WorkloadCommands,
    family: WorkloadFamily,
    session: Session,
) -> Result<()> {
    match command {
        WorkloadCommands::Ls(vars) => {
            run(WorkloadListOpts {
                target: WorkloadTarget::new(family, vars.app.clone(), None, None),
                vars,
                session,
            })
            .await
        }
        WorkloadCommands::Show(vars) => {
            run(WorkloadShowOpts {
                target: WorkloadTarget::new(family, vars.app.clone(), Some(vars.name.clone()), None),
                vars,
                session,
            })
            .await
        }
        WorkloadCommands::Deploy(vars) => {
            run(WorkloadDeployOpts {
                target: WorkloadTarget::new(
                    family,
                    vars.app.clone(),
                    Some(vars.name.clone()),
                    Some(vars.env.clone()),
                ),
                vars,
                session,
            })
            .await
        }
        WorkloadCommands::Status(vars) => {
            run(WorkloadStatusOpts {
                target: WorkloadTarget::new(
                    family,
                    vars.app.clone(),
                    Some(vars.name.clone()),
                    Some(vars.env.clone()),
                ),
                vars,
                session,
            })
            .await
        }
    }
}

/// Flags naming an application, a workload and an environment, and what
/// they resolved to
///
/// The outer `Option` of `name_flag` and `env_flag` says whether the
/// command needs that value at all.
struct WorkloadTarget {
    family: WorkloadFamily,
    app_flag: Option<String>,
    name_flag: Option<Option<String>>,
    env_flag: Option<Option<String>>,
    app: Option<String>,
    workload: Option<Workload>,
    env: Option<Environment>,
}

impl WorkloadTarget {
    fn new(
        family: WorkloadFamily,
        app_flag: Option<String>,
        name_flag: Option<Option<String>>,
        env_flag: Option<Option<String>>,
    ) -> Self {
        Self {
            family,
            app_flag,
            name_flag,
            env_flag,
            app: None,
            workload: None,
            env: None,
        }
    }

    async fn validate(&mut self, session: &Session) -> Result<()> {
        let Some(app) = &self.app_flag else {
            return Ok(());
        };
        self.app = Some(validate_app(session, app).await?);

        if let Some(Some(name)) = &self.name_flag {
            self.workload = Some(validate_workload(session, app, name, self.family).await?);
        }
        if let Some(Some(env)) = &self.env_flag {
            self.env = Some(validate_env(session, app, env).await?);
        }
        Ok(())
    }

    async fn ask(&mut self, session: &Session) -> Result<()> {
        if self.app.is_none() {
            self.app = Some(ask_app(session).await?);
        }
        let app = resolved(&self.app, "application")?;

        if let Some(flag) = &self.name_flag {
            if self.workload.is_none() {
                self.workload = Some(match flag {
                    Some(name) => validate_workload(session, app, name, self.family).await?,
                    None => ask_workload(session, app, self.family).await?,
                });
            }
        }
        if let Some(flag) = &self.env_flag {
            if self.env.is_none() {
                self.env = Some(match flag {
                    Some(env) => validate_env(session, app, env).await?,
                    None => ask_env(session, app).await?,
                });
            }
        }
        Ok(())
    }

    fn app(&self) -> Result<&str> {
        resolved(&self.app, "application").map(String::as_str)
    }

    fn workload(&self) -> Result<&Workload> {
        resolved(&self.workload, self.family.noun())
    }

    fn env(&self) -> Result<&Environment> {
        resolved(&self.env, "environment")
    }
}

pub struct WorkloadListOpts {
    vars: WorkloadListVars,
    session: Session,
    target: WorkloadTarget,
}

#[async_trait]
impl Lifecycle for WorkloadListOpts {
    fn name(&self) -> &'static str {
        "workload ls"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await
    }

    async fn execute(&mut self) -> Result<()> {
        let app = self.target.app()?;
        let family = self.target.family;
        let registered = self
            .session
            .store
            .workloads(app)
            .await
            .with_context(|| format!("Failed to list workloads of '{}'", app))?;
        let workloads: Vec<WorkloadSummary> = registered
            .iter()
            .filter(|w| family.matches(w.kind))
            .cloned()
            .map(WorkloadSummary::from)
            .collect();

        if self.vars.json {
            return print_json(&workloads);
        }

        if workloads.is_empty() {
            println!(
                "{}",
                format!("No {}s found in '{}'.", family.noun(), app).yellow()
            );
        } else {
            println!(
                "{}",
                format!("Found {} {}(s):", workloads.len(), family.noun()).bold()
            );
            println!();
            for workload in &workloads {
                let local = match &self.session.workspace {
                    Some(ws) if ws.has_manifest(&workload.name) => "  (local manifest)",
                    _ => "",
                };
                println!(
                    "  {} {}  {}{}",
                    "▸".cyan(),
                    workload.name.bold(),
                    workload.kind.to_string().dimmed(),
                    local.dimmed()
                );
            }
        }

        if let Some(workspace) = &self.session.workspace {
            let unregistered: Vec<String> = workspace
                .list_workloads()
                .context("Failed to list local manifests")?
                .into_iter()
                .filter(|name| !registered.iter().any(|w| &w.name == name))
                .collect();
            if !unregistered.is_empty() {
                println!();
                println!(
                    "{} {}",
                    "Local manifests not deployed yet:".dimmed(),
                    unregistered.join(", ")
                );
            }
        }

        Ok(())
    }
}

pub struct WorkloadShowOpts {
    vars: WorkloadShowVars,
    session: Session,
    target: WorkloadTarget,
}

#[async_trait]
impl Lifecycle for WorkloadShowOpts {
    fn name(&self) -> &'static str {
        "workload show"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await
    }

    async fn execute(&mut self) -> Result<()> {
        let workload = self.target.workload()?;
        let deployments = self
            .session
            .store
            .deployments(&workload.app, None)
            .await
            .with_context(|| format!("Failed to list deployments of '{}'", workload.app))?;
        let mut history: Vec<_> = deployments
            .into_iter()
            .filter(|d| d.workload.as_deref() == Some(workload.name.as_str()))
            .collect();
        history.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        if self.vars.json {
            return print_json(&serde_json::json!({
                "workload": workload,
                "deployments": history,
            }));
        }

        println!("{}", "Workload Details:".bold());
        println!("  Application: {}", workload.app);
        println!("  Name:        {}", workload.name.bold());
        println!("  Type:        {}", workload.kind);
        println!("  Created:     {}", format_time(&workload.created_at));

        println!("\n{}", "Deployments:".bold());
        if history.is_empty() {
            println!("  {}", "none".dimmed());
        }
        for deployment in &history {
            println!(
                "  {} {:<12} {} {}",
                "▸".cyan(),
                deployment.env,
                colorize_status(&deployment.status),
                format_time(&deployment.started_at).dimmed()
            );
        }

        Ok(())
    }
}

pub struct WorkloadDeployOpts {
    vars: WorkloadDeployVars,
    session: Session,
    target: WorkloadTarget,
}

#[async_trait]
impl Lifecycle for WorkloadDeployOpts {
    fn name(&self) -> &'static str {
        "workload deploy"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await?;
        confirm_production(&self.session, self.target.env()?, self.vars.yes)
    }

    async fn execute(&mut self) -> Result<()> {
        let app = self.target.app()?;
        let env = self.target.env()?;
        let workload = self.target.workload()?;
        let req = workload_request(
            &self.session,
            &workload.name,
            self.vars.tag.clone(),
            self.vars.force,
        )?;

        info!(app, env = %env.name, workload = %workload.name, "deploying workload");
        match self
            .session
            .deployer
            .deploy_workload(app, &env.name, &workload.name, &req)
            .await
        {
            Ok(deployment) => {
                println!(
                    "{} {} {} {}",
                    "✓ Deployed".green().bold(),
                    workload.name.bold(),
                    "to".green().bold(),
                    env.name.bold()
                );
                println!("  Deployment: {}", deployment.id.to_string().cyan());
                println!("  Status:     {}", colorize_status(&deployment.status));
                Ok(())
            }
            Err(err) if err.is_no_changes() => {
                println!(
                    "{}",
                    format!("✓ No infrastructure changes for {}/{}", env.name, workload.name)
                        .green()
                );
                Ok(())
            }
            Err(err) => Err(err).context(format!(
                "Failed to deploy {} '{}'",
                self.target.family.noun(),
                workload.name
            )),
        }
    }
}

pub struct WorkloadStatusOpts {
    vars: WorkloadStatusVars,
    session: Session,
    target: WorkloadTarget,
}

#[async_trait]
impl Lifecycle for WorkloadStatusOpts {
    fn name(&self) -> &'static str {
        "workload status"
    }

    async fn validate(&mut self) -> Result<()> {
        self.target.validate(&self.session).await
    }

    async fn ask(&mut self) -> Result<()> {
        self.target.ask(&self.session).await
    }

    async fn execute(&mut self) -> Result<()> {
        let app = self.target.app()?;
        let env = self.target.env()?;
        let workload = self.target.workload()?;
        let status = self
            .session
            .store
            .workload_status(app, &env.name, &workload.name)
            .await
            .with_context(|| {
                format!("Failed to get status of '{}' in '{}'", workload.name, env.name)
            })?;

        if self.vars.json {
            return print_json(&status);
        }

        let tasks = format!("{}/{}", status.running_count, status.desired_count);
        println!("{}", "Workload Status:".bold());
        println!("  Workload:    {}", format!("{}/{}", status.env, status.name).bold());
        println!(
            "  Tasks:       {}",
            if status.running_count >= status.desired_count {
                tasks.green()
            } else {
                tasks.yellow()
            }
        );
        if let Some(image) = &status.image {
            println!("  Image:       {}", image);
        }
        if let Some(endpoint) = &status.endpoint {
            println!("  Endpoint:    {}", endpoint.cyan());
        }
        if let Some(last) = &status.last_deployment {
            println!(
                "  Last deploy: {} {}",
                colorize_status(&last.status),
                format_time(&last.started_at).dimmed()
            );
        }

        Ok(())
    }
}

/// Build the deploy request for workload `name`
///
/// The manifest is taken from the local workspace when it has one for `name`,
/// otherwise the control plane uses the manifest it already stores.
pub fn workload_request(
    session: &Session,
    name: &str,
    image_tag: Option<String>,
    force: bool,
) -> Result<DeployWorkloadRequest> {
    let manifest = match &session.workspace {
        Some(workspace) if workspace.has_manifest(name) => {
            let manifest = workspace
                .read_manifest(name)
                .with_context(|| format!("Failed to read manifest of '{}'", name))?;
            debug!(workload = %manifest.name, kind = %manifest.kind, "using local manifest");
            Some(manifest.raw)
        }
        _ => None,
    };

    Ok(DeployWorkloadRequest {
        manifest,
        image_tag,
        force,
    })
}
