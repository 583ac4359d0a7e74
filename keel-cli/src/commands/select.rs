//! Flag resolution shared by commands
//!
//! `validate_*` check a value the user passed, `ask_*` find one when no
//! flag was passed: from the workspace, from the only candidate, or by
//! prompting.

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

use super::lifecycle::Session;
use keel_client::ClientError;
use keel_core::domain::environment::Environment;
use keel_core::domain::workload::{Workload, WorkloadKind};

/// Which side of the workload commands is in use, `svc` or `job`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadFamily {
    Service,
    Job,
}

impl WorkloadFamily {
    pub fn noun(&self) -> &'static str {
        match self {
            WorkloadFamily::Service => "service",
            WorkloadFamily::Job => "job",
        }
    }

    pub fn matches(&self, kind: WorkloadKind) -> bool {
        match self {
            WorkloadFamily::Service => kind.is_service(),
            WorkloadFamily::Job => kind.is_job(),
        }
    }
}

/// Turn a lookup failure into "does not exist" when the store says 404
fn lookup_error(err: ClientError, subject: String, scope: &str) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!("{} does not exist{}", subject, scope)
    } else {
        anyhow::Error::new(err).context(format!("Failed to look up {}", subject))
    }
}

/// Pick among `options`: none is an error, one is taken as is, more are prompted
fn choose_one(
    session: &Session,
    message: &str,
    flag: &str,
    options: Vec<String>,
    none: impl FnOnce() -> String,
) -> Result<String> {
    match options.len() {
        0 => Err(anyhow!(none())),
        1 => Ok(options.into_iter().next().unwrap_or_default()),
        _ => session.prompter.select(message, flag, &options),
    }
}

/// Check that application `name` exists
pub async fn validate_app(session: &Session, name: &str) -> Result<String> {
    session
        .store
        .application(name)
        .await
        .map_err(|e| lookup_error(e, format!("application '{}'", name), ""))?;

    Ok(name.to_string())
}

/// Find the application when `--app` was not given
///
/// The workspace's application wins, then the only application, then a prompt.
pub async fn ask_app(session: &Session) -> Result<String> {
    if let Some(workspace) = &session.workspace {
        debug!(app = workspace.application(), "using workspace application");
        return Ok(workspace.application().to_string());
    }

    let apps = session
        .store
        .applications()
        .await
        .context("Failed to list applications")?;
    let names = apps.into_iter().map(|app| app.name).collect();

    choose_one(session, "Which application?", "app", names, || {
        "no applications found".to_string()
    })
}

/// Check that environment `name` exists in `app`
pub async fn validate_env(session: &Session, app: &str, name: &str) -> Result<Environment> {
    session.store.environment(app, name).await.map_err(|e| {
        lookup_error(
            e,
            format!("environment '{}'", name),
            &format!(" in application '{}'", app),
        )
    })
}

/// Find the environment when `--env` was not given
pub async fn ask_env(session: &Session, app: &str) -> Result<Environment> {
    let envs = session
        .store
        .environments(app)
        .await
        .with_context(|| format!("Failed to list environments of application '{}'", app))?;
    let names = envs.iter().map(|env| env.name.clone()).collect();

    let chosen = choose_one(session, "Which environment?", "env", names, || {
        format!("no environments found in application '{}'", app)
    })?;

    envs.into_iter()
        .find(|env| env.name == chosen)
        .ok_or_else(|| anyhow!("environment '{}' does not exist in application '{}'", chosen, app))
}

/// Check that workload `name` exists in `app` and belongs to `family`
pub async fn validate_workload(
    session: &Session,
    app: &str,
    name: &str,
    family: WorkloadFamily,
) -> Result<Workload> {
    let workload = session.store.workload(app, name).await.map_err(|e| {
        lookup_error(
            e,
            format!("{} '{}'", family.noun(), name),
            &format!(" in application '{}'", app),
        )
    })?;

    if !family.matches(workload.kind) {
        bail!(
            "'{}' is a {}, not a {}",
            name,
            workload.kind,
            family.noun()
        );
    }

    Ok(workload)
}

/// Find the workload when `--name` was not given
pub async fn ask_workload(session: &Session, app: &str, family: WorkloadFamily) -> Result<Workload> {
    let workloads: Vec<Workload> = session
        .store
        .workloads(app)
        .await
        .with_context(|| format!("Failed to list workloads of application '{}'", app))?
        .into_iter()
        .filter(|w| family.matches(w.kind))
        .collect();
    let names = workloads.iter().map(|w| w.name.clone()).collect();

    let message = format!("Which {}?", family.noun());
    let chosen = choose_one(session, &message, "name", names, || {
        format!("no {}s found in application '{}'", family.noun(), app)
    })?;

    workloads
        .into_iter()
        .find(|w| w.name == chosen)
        .ok_or_else(|| anyhow!("{} '{}' does not exist", family.noun(), chosen))
}

/// Ask before touching a production environment unless `--yes` was given
pub fn confirm_production(session: &Session, env: &Environment, yes: bool) -> Result<()> {
    if !env.production || yes {
        return Ok(());
    }

    let message = format!("Deploy to production environment '{}'?", env.name);
    if !session.prompter.confirm(&message, false)? {
        bail!(
            "deployment to production environment '{}' cancelled, pass --yes to skip this check",
            env.name
        );
    }

    Ok(())
}
