//! Application command handlers

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use colored::*;
use serde_json::json;

use super::lifecycle::{Lifecycle, Session, resolved, run};
use super::select::{ask_app, validate_app};
use crate::output::{format_time, print_json};
use keel_core::domain::application::Application;
use keel_core::dto::workload::WorkloadSummary;

/// Application subcommands
#[derive(Subcommand)]
pub enum AppCommands {
    /// List all applications
    Ls(AppListVars),
    /// Show an application with its environments and workloads
    Show(AppShowVars),
}

#[derive(Args, Debug, Clone)]
pub struct AppListVars {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AppShowVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub name: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Handle application commands
pub async fn handle_app_command(command: AppCommands, session: Session) -> Result<()> {
    match command {
        AppCommands::Ls(vars) => run(AppListOpts { vars, session }).await,
        AppCommands::Show(vars) => {
            run(AppShowOpts {
                vars,
                session,
                app: None,
            })
            .await
        }
    }
}

pub struct AppListOpts {
    vars: AppListVars,
    session: Session,
}

#[async_trait]
impl Lifecycle for AppListOpts {
    fn name(&self) -> &'static str {
        "app ls"
    }

    async fn execute(&mut self) -> Result<()> {
        let apps = self
            .session
            .store
            .applications()
            .await
            .context("Failed to list applications")?;

        if self.vars.json {
            return print_json(&apps);
        }

        if apps.is_empty() {
            println!("{}", "No applications found.".yellow());
        } else {
            println!("{}", format!("Found {} application(s):", apps.len()).bold());
            println!();
            for app in &apps {
                print_application_summary(app);
            }
        }

        Ok(())
    }
}

pub struct AppShowOpts {
    vars: AppShowVars,
    session: Session,
    app: Option<String>,
}

#[async_trait]
impl Lifecycle for AppShowOpts {
    fn name(&self) -> &'static str {
        "app show"
    }

    async fn validate(&mut self) -> Result<()> {
        if let Some(name) = &self.vars.name {
            self.app = Some(validate_app(&self.session, name).await?);
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
        let name = resolved(&self.app, "application")?;
        let store = &self.session.store;

        let app = store
            .application(name)
            .await
            .with_context(|| format!("Failed to get application '{}'", name))?;
        let envs = store
            .environments(name)
            .await
            .with_context(|| format!("Failed to list environments of '{}'", name))?;
        let workloads: Vec<WorkloadSummary> = store
            .workloads(name)
            .await
            .with_context(|| format!("Failed to list workloads of '{}'", name))?
            .into_iter()
            .map(WorkloadSummary::from)
            .collect();

        if self.vars.json {
            return print_json(&json!({
                "application": app,
                "environments": envs,
                "workloads": workloads,
            }));
        }

        println!("{}", "Application Details:".bold());
        println!("  Name:    {}", app.name.bold());
        if let Some(domain) = &app.domain {
            println!("  Domain:  {}", domain);
        }
        println!("  Created: {}", format_time(&app.created_at));

        println!("\n{}", "Environments:".bold());
        if envs.is_empty() {
            println!("  {}", "none".dimmed());
        }
        for env in &envs {
            let production = if env.production { " (production)" } else { "" };
            println!(
                "  {} {}{}  {}",
                "▸".cyan(),
                env.name.bold(),
                production.red(),
                env.region.dimmed()
            );
        }

        println!("\n{}", "Workloads:".bold());
        if workloads.is_empty() {
            println!("  {}", "none".dimmed());
        }
        for workload in &workloads {
            println!(
                "  {} {}  {}",
                "▸".cyan(),
                workload.name.bold(),
                workload.kind.to_string().dimmed()
            );
        }

        Ok(())
    }
}

fn print_application_summary(app: &Application) {
    println!("  {} {}", "▸".cyan(), app.name.bold());
    if let Some(domain) = &app.domain {
        println!("    Domain:  {}", domain.dimmed());
    }
    println!("    Created: {}", format_time(&app.created_at).dimmed());
    if !app.tags.is_empty() {
        println!("    Tags:    {}", app.tags.join(", ").dimmed());
    }
    println!();
}
