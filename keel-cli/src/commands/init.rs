//! Init command handlers
//!
//! Creates the local workspace and scaffolds workload manifests in it.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use colored::*;
use std::path::PathBuf;

use super::lifecycle::{Lifecycle, Session, resolved, run};
use super::select::{ask_app, validate_app};
use crate::workspace::{WORKSPACE_DIR, Workspace};
use keel_core::domain::workload::WorkloadKind;

/// Init subcommands
#[derive(Subcommand)]
pub enum InitCommands {
    /// Create a workspace for an application in the current directory
    Workspace(InitWorkspaceVars),
    /// Scaffold a manifest for a new workload
    Workload(InitWorkloadVars),
}

#[derive(Args, Debug, Clone)]
pub struct InitWorkspaceVars {
    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InitWorkloadVars {
    /// Workload name
    #[arg(short, long)]
    pub name: String,

    /// Workload type, e.g. "Backend Service"
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// Overwrite an existing manifest
    #[arg(long)]
    pub force: bool,
}

/// Handle init commands
pub async fn handle_init_command(command: InitCommands, session: Session) -> Result<()> {
    match command {
        InitCommands::Workspace(vars) => {
            let root = std::env::current_dir().context("Failed to read current directory")?;
            run(InitWorkspaceOpts {
                vars,
                session,
                root,
                app: None,
            })
            .await
        }
        InitCommands::Workload(vars) => {
            run(InitWorkloadOpts {
                vars,
                session,
                kind: None,
            })
            .await
        }
    }
}

pub struct InitWorkspaceOpts {
    vars: InitWorkspaceVars,
    session: Session,
    /// Project directory the workspace is created in
    root: PathBuf,
    app: Option<String>,
}

#[async_trait]
impl Lifecycle for InitWorkspaceOpts {
    fn name(&self) -> &'static str {
        "init workspace"
    }

    async fn validate(&mut self) -> Result<()> {
        if let Some(workspace) = &self.session.workspace {
            bail!(
                "already inside the workspace of application '{}' at {}",
                workspace.application(),
                workspace.root().display()
            );
        }
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
        let workspace = Workspace::create(&self.root, app)?;

        println!("{}", "✓ Workspace created!".green().bold());
        println!("  Application: {}", app.bold());
        println!("  Path:        {}", workspace.root().display().to_string().cyan());
        println!();
        println!(
            "Add a workload with {}",
            "keel init workload --name <name> --type <type>".cyan()
        );

        Ok(())
    }
}

pub struct InitWorkloadOpts {
    vars: InitWorkloadVars,
    session: Session,
    kind: Option<WorkloadKind>,
}

impl InitWorkloadOpts {
    fn workspace(&self) -> Result<&Workspace> {
        self.session.workspace.as_ref().ok_or_else(|| {
            anyhow!(
                "no {}/ workspace found, run `keel init workspace` first",
                WORKSPACE_DIR
            )
        })
    }
}

#[async_trait]
impl Lifecycle for InitWorkloadOpts {
    fn name(&self) -> &'static str {
        "init workload"
    }

    async fn validate(&mut self) -> Result<()> {
        self.workspace()?;

        let name = &self.vars.name;
        if name.is_empty() {
            bail!("workload name cannot be empty");
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            bail!(
                "workload name '{}' may only contain lowercase letters, digits and '-'",
                name
            );
        }

        if let Some(kind) = &self.vars.kind {
            self.kind = Some(kind.parse()?);
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.kind.is_none() {
            let options: Vec<String> = WorkloadKind::ALL
                .iter()
                .map(|kind| kind.to_string())
                .collect();
            let picked = self
                .session
                .prompter
                .select("Which workload type?", "type", &options)?;
            self.kind = Some(picked.parse()?);
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let kind = *resolved(&self.kind, "workload type")?;
        let name = &self.vars.name;
        let path = self.workspace()?.write_manifest(name, kind, self.vars.force)?;

        println!("{}", "✓ Manifest written!".green().bold());
        println!("  Workload: {}", name.bold());
        println!("  Type:     {}", kind.to_string().dimmed());
        println!("  Path:     {}", path.display().to_string().cyan());
        println!();
        let command = if kind.is_job() { "job" } else { "svc" };
        println!(
            "Deploy it with {}",
            format!("keel {} deploy --name {}", command, name).cyan()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{FakeStore, ScriptedPrompter, session, session_with};
    use crate::prompt::DisabledPrompter;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_workspace_in_project() {
        let project = TempDir::new().unwrap();
        let store = Arc::new(FakeStore::new("shop"));
        run(InitWorkspaceOpts {
            vars: InitWorkspaceVars { app: None },
            session: session(store, DisabledPrompter),
            root: project.path().to_path_buf(),
            app: None,
        })
        .await
        .unwrap();

        let workspace = Workspace::discover(project.path()).unwrap();
        assert_eq!(workspace.application(), "shop");
    }

    #[tokio::test]
    async fn test_init_workload_requires_workspace() {
        let store = Arc::new(FakeStore::new("shop"));
        let err = run(InitWorkloadOpts {
            vars: InitWorkloadVars {
                name: "api".to_string(),
                kind: Some("Backend Service".to_string()),
                force: false,
            },
            session: session(store, DisabledPrompter),
            kind: None,
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("keel init workspace"));
    }

    #[tokio::test]
    async fn test_init_workload_prompts_for_type() {
        let project = TempDir::new().unwrap();
        let workspace = Workspace::create(project.path(), "shop").unwrap();
        let store = Arc::new(FakeStore::new("shop"));
        let prompter = ScriptedPrompter::new().select("Scheduled Job");

        run(InitWorkloadOpts {
            vars: InitWorkloadVars {
                name: "nightly".to_string(),
                kind: None,
                force: false,
            },
            session: session_with(store, prompter, Some(workspace.clone())),
            kind: None,
        })
        .await
        .unwrap();

        let manifest = workspace.read_manifest("nightly").unwrap();
        assert_eq!(manifest.kind, WorkloadKind::ScheduledJob);
    }

    #[tokio::test]
    async fn test_init_workload_rejects_bad_name() {
        let project = TempDir::new().unwrap();
        let workspace = Workspace::create(project.path(), "shop").unwrap();
        let store = Arc::new(FakeStore::new("shop"));

        let result = run(InitWorkloadOpts {
            vars: InitWorkloadVars {
                name: "api/1".to_string(),
                kind: Some("Backend Service".to_string()),
                force: false,
            },
            session: session_with(store, DisabledPrompter, Some(workspace)),
            kind: None,
        })
        .await;

        assert!(result.is_err());
    }
}
