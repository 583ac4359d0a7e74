//! Multi-workload deploy
//!
//! `keel deploy db/1 api/2 web/2 worker` deploys `db`, then `api` and `web`
//! together, then `worker`. `--all` adds every other workload of the
//! application to the untagged group.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use clap::Args;
use colored::*;
use std::collections::BTreeMap;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::env::deploy_environment;
use super::lifecycle::{Lifecycle, Session, resolved};
use super::select::{ask_app, ask_env, confirm_production, validate_app, validate_env};
use super::workload::workload_request;
use crate::output::colorize_status;
use keel_client::{DeployError, WorkloadCatalog};
use keel_core::domain::deployment::Deployment;
use keel_core::domain::environment::Environment;
use keel_core::dto::workload::{DeployWorkloadRequest, WorkloadSummary};
use keel_core::order::{
    DeploymentGroup, DeploymentPlan, OrderError, WorkloadToken, group_workloads, validate_tokens,
};

#[derive(Args, Debug, Clone, Default)]
pub struct DeployVars {
    /// Workloads to deploy, each optionally tagged with a deploy order (`name/N`)
    #[arg(value_name = "NAME[/ORDER]")]
    pub workloads: Vec<String>,

    /// Workload to deploy, may be repeated
    #[arg(short, long = "name", value_name = "NAME[/ORDER]")]
    pub names: Vec<String>,

    /// Also deploy every workload of the application not named explicitly
    #[arg(long)]
    pub all: bool,

    /// Application name
    #[arg(short, long, env = "KEEL_APP")]
    pub app: Option<String>,

    /// Environment name
    #[arg(short, long, env = "KEEL_ENV")]
    pub env: Option<String>,

    /// Deploy the environment infrastructure before the workloads
    #[arg(long)]
    pub deploy_env: bool,

    /// Redeploy even if nothing changed
    #[arg(long)]
    pub force: bool,

    /// Container image tag for every deployed workload
    #[arg(long)]
    pub tag: Option<String>,

    /// Skip the confirmation for production environments
    #[arg(short, long)]
    pub yes: bool,
}

/// Workload listing of one application, fetched at most once per command
#[derive(Default)]
struct CatalogCache {
    listing: Option<Vec<WorkloadSummary>>,
}

impl CatalogCache {
    async fn get<C>(&mut self, catalog: &C, app: &str) -> Result<&[WorkloadSummary], OrderError>
    where
        C: WorkloadCatalog + ?Sized,
    {
        if self.listing.is_none() {
            debug!(app, "fetching workload catalog");
            let listing = catalog.list_workloads(app).await.map_err(|source| {
                OrderError::CatalogUnavailable {
                    app: app.to_string(),
                    source: Box::new(source),
                }
            })?;
            self.listing = Some(listing);
        }

        Ok(self.listing.as_deref().unwrap_or_default())
    }
}

/// How one workload deploy ended
enum Outcome {
    Deployed(Deployment),
    NoChanges,
    Failed(DeployError),
}

pub struct DeployOpts {
    vars: DeployVars,
    session: Session,
    tokens: Vec<WorkloadToken>,
    app: Option<String>,
    env: Option<Environment>,
    catalog: CatalogCache,
}

impl DeployOpts {
    pub fn new(vars: DeployVars, session: Session) -> Self {
        Self {
            vars,
            session,
            tokens: Vec::new(),
            app: None,
            env: None,
            catalog: CatalogCache::default(),
        }
    }

    /// Deploy request of every workload in `plan`, keyed by name
    fn plan_requests(&self, plan: &DeploymentPlan) -> Result<BTreeMap<String, DeployWorkloadRequest>> {
        plan.workloads()
            .into_iter()
            .map(|name| {
                let req = workload_request(&self.session, name, self.vars.tag.clone(), self.vars.force)?;
                Ok((name.to_string(), req))
            })
            .collect()
    }

    /// Run one group, waiting for every member before returning
    ///
    /// # Returns
    /// Names of the members that failed
    async fn deploy_group(
        &self,
        app: &str,
        env: &str,
        group: &DeploymentGroup,
        requests: &BTreeMap<String, DeployWorkloadRequest>,
    ) -> Result<Vec<String>> {
        let mut tasks = JoinSet::new();
        for name in group.iter() {
            let req = requests.get(name).cloned().unwrap_or_default();
            let deployer = self.session.deployer.clone();
            let (app, env, name) = (app.to_string(), env.to_string(), name.to_string());

            tasks.spawn(async move {
                let outcome = match deployer.deploy_workload(&app, &env, &name, &req).await {
                    Ok(deployment) => Outcome::Deployed(deployment),
                    Err(err) if err.is_no_changes() => Outcome::NoChanges,
                    Err(err) => Outcome::Failed(err),
                };
                (name, outcome)
            });
        }

        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (name, outcome) = joined.context("Deploy task panicked")?;
            match outcome {
                Outcome::Deployed(deployment) => {
                    info!(workload = %name, id = %deployment.id, "workload deployed");
                    println!(
                        "  {} {} {}",
                        "✓".green(),
                        name.bold(),
                        colorize_status(&deployment.status)
                    );
                }
                Outcome::NoChanges => {
                    info!(workload = %name, "workload already up to date");
                    println!(
                        "  {} {} {}",
                        "✓".green(),
                        name.bold(),
                        "no infrastructure changes".dimmed()
                    );
                }
                Outcome::Failed(err) => {
                    let message = format!("{:#}", anyhow::Error::new(err));
                    warn!(workload = %name, error = %message, "workload deploy failed");
                    println!("  {} {} {}", "✗".red(), name.bold(), message.red());
                    failed.push(name);
                }
            }
        }
        failed.sort();

        Ok(failed)
    }
}

#[async_trait]
impl Lifecycle for DeployOpts {
    fn name(&self) -> &'static str {
        "deploy"
    }

    async fn validate(&mut self) -> Result<()> {
        self.tokens = self
            .vars
            .workloads
            .iter()
            .chain(&self.vars.names)
            .map(|token| WorkloadToken::parse(token))
            .collect::<Result<_, _>>()?;
        validate_tokens(&self.tokens, self.session.config.max_deploy_order)?;

        if let Some(app) = &self.vars.app {
            self.app = Some(validate_app(&self.session, app).await?);
            if let Some(env) = &self.vars.env {
                self.env = Some(validate_env(&self.session, app, env).await?);
            }
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.app.is_none() {
            self.app = Some(ask_app(&self.session).await?);
        }
        let app = resolved(&self.app, "application")?;

        if self.env.is_none() {
            self.env = Some(match &self.vars.env {
                Some(env) => validate_env(&self.session, app, env).await?,
                None => ask_env(&self.session, app).await?,
            });
        }

        if self.tokens.is_empty() && !self.vars.all && self.session.config.prompt {
            let options: Vec<String> = self
                .catalog
                .get(self.session.store.as_ref(), app)
                .await?
                .iter()
                .map(|w| w.name.clone())
                .collect();
            if options.is_empty() {
                debug!(app, "no workloads to choose from");
                return Ok(());
            }
            let picked = self
                .session
                .prompter
                .multi_select("Which workloads?", "name", &options)?;
            self.tokens = picked.into_iter().map(WorkloadToken::new).collect();
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        if self.tokens.is_empty() && !self.vars.all {
            return Err(OrderError::EmptyWorkloadSet.into());
        }

        let app = resolved(&self.app, "application")?;
        let env = resolved(&self.env, "environment")?;

        let catalog = self.catalog.get(self.session.store.as_ref(), app).await?;
        let known: Vec<String> = catalog.iter().map(|w| w.name.clone()).collect();

        let mut unknown: Vec<&str> = self
            .tokens
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| !known.iter().any(|k| k == name))
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            bail!(
                "workload(s) not found in application '{}': {}",
                app,
                unknown.join(", ")
            );
        }

        let remaining = if self.vars.all { Some(known.as_slice()) } else { None };
        let plan = group_workloads(&self.tokens, remaining)?;
        let requests = self.plan_requests(&plan)?;
        print_plan(app, &env.name, &plan);

        confirm_production(&self.session, env, self.vars.yes)?;

        if self.vars.deploy_env {
            deploy_environment(&self.session, app, &env.name, self.vars.force).await?;
        }

        let total = plan.len();
        for (index, group) in plan.groups().iter().enumerate() {
            info!(group = index + 1, total, members = group.len(), "deploying group");
            println!(
                "\n{}",
                format!("Group {}/{} ({})", index + 1, total, group_label(group)).bold()
            );

            let failed = self
                .deploy_group(app, &env.name, group, &requests)
                .await?;
            if !failed.is_empty() {
                let skipped = total - index - 1;
                if skipped > 0 {
                    warn!(skipped, "not deploying remaining groups");
                    println!(
                        "{}",
                        format!("Skipped {} remaining group(s).", skipped).yellow()
                    );
                }
                return Err(anyhow!(
                    "failed to deploy {} workload(s) to '{}': {}",
                    failed.len(),
                    env.name,
                    failed.join(", ")
                ));
            }
        }

        println!(
            "\n{}",
            format!("✓ Deployed {} workload(s) to {}", plan.workloads().len(), env.name)
                .green()
                .bold()
        );
        Ok(())
    }
}

fn group_label(group: &DeploymentGroup) -> String {
    match group.ordinal() {
        Some(ordinal) => format!("order {}", ordinal),
        None => "unordered".to_string(),
    }
}

fn print_plan(app: &str, env: &str, plan: &DeploymentPlan) {
    println!("{}", format!("Deployment plan for {}/{}:", app, env).bold());
    for (index, group) in plan.groups().iter().enumerate() {
        println!(
            "  {}. {:<11} {}",
            index + 1,
            format!("[{}]", group_label(group)).dimmed(),
            group.iter().collect::<Vec<_>>().join(", ").cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::lifecycle::run;
    use crate::commands::testing::{FakeStore, ScriptedPrompter, session, session_with};
    use crate::prompt::DisabledPrompter;
    use crate::workspace::Workspace;
    use keel_core::domain::workload::WorkloadKind;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store() -> FakeStore {
        FakeStore::new("shop")
            .with_env("test", false)
            .with_workload("db", WorkloadKind::BackendService)
            .with_workload("api", WorkloadKind::BackendService)
            .with_workload("web", WorkloadKind::LoadBalancedWebService)
            .with_workload("worker", WorkloadKind::WorkerService)
    }

    fn vars(tokens: &[&str]) -> DeployVars {
        DeployVars {
            workloads: tokens.iter().map(|t| t.to_string()).collect(),
            app: Some("shop".to_string()),
            env: Some("test".to_string()),
            ..Default::default()
        }
    }

    fn non_interactive(store: Arc<FakeStore>) -> Session {
        let mut session = session(store, DisabledPrompter);
        session.config.prompt = false;
        session
    }

    fn set(targets: &[String]) -> HashSet<&str> {
        targets.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_groups_deploy_in_order() {
        let store = Arc::new(store());
        run(DeployOpts::new(
            vars(&["worker", "web/2", "db/1", "api/2"]),
            non_interactive(store.clone()),
        ))
        .await
        .unwrap();

        let deployed = store.deployed();
        assert_eq!(deployed.len(), 4);
        assert_eq!(deployed[0], "test/db");
        assert_eq!(set(&deployed[1..3]), HashSet::from(["test/api", "test/web"]));
        assert_eq!(deployed[3], "test/worker");
    }

    #[tokio::test]
    async fn test_all_adds_remaining_workloads_last() {
        let store = Arc::new(store());
        let mut vars = vars(&["api/2"]);
        vars.all = true;
        run(DeployOpts::new(vars, non_interactive(store.clone())))
            .await
            .unwrap();

        let deployed = store.deployed();
        assert_eq!(deployed[0], "test/api");
        assert_eq!(
            set(&deployed[1..]),
            HashSet::from(["test/db", "test/web", "test/worker"])
        );
    }

    #[tokio::test]
    async fn test_name_flag_joins_positional_tokens() {
        let store = Arc::new(store());
        let mut vars = vars(&["api/2"]);
        vars.names = vec!["db/1".to_string()];
        run(DeployOpts::new(vars, non_interactive(store.clone())))
            .await
            .unwrap();

        assert_eq!(store.deployed(), vec!["test/db", "test/api"]);
    }

    #[tokio::test]
    async fn test_empty_selection_fails_before_catalog() {
        let store = Arc::new(store());
        let err = run(DeployOpts::new(vars(&[]), non_interactive(store.clone())))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::EmptyWorkloadSet)
        ));
        assert_eq!(store.catalog_calls(), 0);
        assert!(store.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_picked_interactively_is_empty_set() {
        let store = Arc::new(store());
        let prompter = ScriptedPrompter::new().multi_select(&[]);
        let err = run(DeployOpts::new(vars(&[]), session(store.clone(), prompter)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::EmptyWorkloadSet)
        ));
    }

    #[tokio::test]
    async fn test_application_without_workloads_skips_prompt() {
        let store = Arc::new(FakeStore::new("shop").with_env("test", false));
        let err = run(DeployOpts::new(
            vars(&[]),
            session(store.clone(), ScriptedPrompter::new()),
        ))
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::EmptyWorkloadSet)
        ));
    }

    #[tokio::test]
    async fn test_catalog_fetched_once() {
        let store = Arc::new(store());
        let prompter = ScriptedPrompter::new().multi_select(&["web", "api"]);
        run(DeployOpts::new(vars(&[]), session(store.clone(), prompter)))
            .await
            .unwrap();

        assert_eq!(store.catalog_calls(), 1);
        assert_eq!(
            set(&store.deployed()),
            HashSet::from(["test/api", "test/web"])
        );
    }

    #[tokio::test]
    async fn test_invalid_tag_fails_validation_without_calls() {
        let store = Arc::new(store());
        let err = run(DeployOpts::new(vars(&["api/first"]), non_interactive(store.clone())))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::InvalidOrderTag { .. })
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_tag_above_configured_maximum() {
        let store = Arc::new(store());
        let mut session = non_interactive(store);
        session.config.max_deploy_order = 3;
        let err = run(DeployOpts::new(vars(&["api/4"]), session))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::InvalidOrderTag { .. })
        ));
    }

    #[tokio::test]
    async fn test_conflicting_tags_rejected() {
        let store = Arc::new(store());
        let err = run(DeployOpts::new(vars(&["api/1", "api/2"]), non_interactive(store)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::ConflictingOrderTag { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_workload_rejected_before_deploying() {
        let store = Arc::new(store());
        let err = run(DeployOpts::new(vars(&["api/1", "cache"]), non_interactive(store.clone())))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "workload(s) not found in application 'shop': cache"
        );
        assert!(store.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_unavailable() {
        let store = Arc::new(store().catalog_down());
        let err = run(DeployOpts::new(vars(&["api"]), non_interactive(store.clone())))
            .await
            .unwrap_err();

        match err.downcast_ref::<OrderError>() {
            Some(OrderError::CatalogUnavailable { app, .. }) => assert_eq!(app, "shop"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_failed_group_stops_later_groups() {
        let store = Arc::new(store().failing("test/api"));
        let err = run(DeployOpts::new(
            vars(&["api/1", "web/1", "worker/2", "db"]),
            non_interactive(store.clone()),
        ))
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to deploy 1 workload(s) to 'test': api"
        );
        // the failing group still runs to completion
        assert_eq!(
            set(&store.deployed()),
            HashSet::from(["test/api", "test/web"])
        );
    }

    #[tokio::test]
    async fn test_no_changes_is_not_a_failure() {
        let store = Arc::new(store().no_changes("test/db"));
        run(DeployOpts::new(vars(&["db/1", "api/2"]), non_interactive(store.clone())))
            .await
            .unwrap();

        assert_eq!(store.deployed(), vec!["test/db", "test/api"]);
    }

    #[tokio::test]
    async fn test_environment_deployed_first() {
        let store = Arc::new(store().no_changes("test"));
        let mut vars = vars(&["api"]);
        vars.deploy_env = true;
        run(DeployOpts::new(vars, non_interactive(store.clone())))
            .await
            .unwrap();

        assert_eq!(store.deployed(), vec!["test", "test/api"]);
    }

    #[tokio::test]
    async fn test_failed_environment_deploys_no_workload() {
        let store = Arc::new(store().failing("test"));
        let mut vars = vars(&["api"]);
        vars.deploy_env = true;
        let result = run(DeployOpts::new(vars, non_interactive(store.clone()))).await;

        assert!(result.is_err());
        assert_eq!(store.deployed(), vec!["test"]);
    }

    #[tokio::test]
    async fn test_production_requires_confirmation() {
        let store = Arc::new(store().with_env("prod", true));
        let mut vars = vars(&["api"]);
        vars.env = Some("prod".to_string());
        let result = run(DeployOpts::new(vars, non_interactive(store.clone()))).await;

        assert!(result.is_err());
        assert!(store.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_broken_manifest_deploys_nothing() {
        let project = TempDir::new().unwrap();
        let workspace = Workspace::create(project.path(), "shop").unwrap();
        workspace
            .write_manifest("db", WorkloadKind::BackendService, false)
            .unwrap();
        let api_dir = workspace.root().join("api");
        std::fs::create_dir_all(&api_dir).unwrap();
        std::fs::write(api_dir.join("manifest.toml"), "name = [broken").unwrap();

        let store = Arc::new(store());
        let mut session = session_with(store.clone(), DisabledPrompter, Some(workspace));
        session.config.prompt = false;
        let err = run(DeployOpts::new(vars(&["db/1", "api/2"]), session))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("'api'"));
        assert!(store.deployed().is_empty());
    }
}
