//! In-memory collaborators for command tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use super::lifecycle::Session;
use crate::config::Config;
use crate::prompt::Prompter;
use crate::workspace::Workspace;
use keel_client::{ClientError, ConfigStore, DeployError, Deployer, WorkloadCatalog};
use keel_core::domain::application::Application;
use keel_core::domain::deployment::{Deployment, DeploymentStatus};
use keel_core::domain::environment::Environment;
use keel_core::domain::workload::{Workload, WorkloadKind, WorkloadStatus};
use keel_core::dto::environment::DeployEnvironmentRequest;
use keel_core::dto::workload::{DeployWorkloadRequest, WorkloadSummary};

type ClientResult<T> = std::result::Result<T, ClientError>;

/// A control plane holding one application
#[derive(Default)]
pub struct FakeStore {
    app: String,
    envs: Vec<Environment>,
    workloads: Vec<Workload>,
    deployments: Vec<Deployment>,
    catalog_down: bool,
    no_changes: HashSet<String>,
    failing: HashSet<String>,
    catalog_calls: AtomicUsize,
    calls: AtomicUsize,
    deployed: Mutex<Vec<String>>,
    workload_requests: Mutex<Vec<(String, DeployWorkloadRequest)>>,
}

impl FakeStore {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, name: &str, production: bool) -> Self {
        self.envs.push(Environment {
            app: self.app.clone(),
            name: name.to_string(),
            region: "eu-west-1".to_string(),
            account_id: None,
            production,
            created_at: Utc::now(),
        });
        self
    }

    pub fn with_workload(mut self, name: &str, kind: WorkloadKind) -> Self {
        self.workloads.push(Workload {
            app: self.app.clone(),
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
        });
        self
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.deployments.push(deployment);
        self
    }

    /// Make every catalog listing fail
    pub fn catalog_down(mut self) -> Self {
        self.catalog_down = true;
        self
    }

    /// Make deploying `target` (`env` or `env/name`) report no changes
    pub fn no_changes(mut self, target: &str) -> Self {
        self.no_changes.insert(target.to_string());
        self
    }

    /// Make deploying `target` fail
    pub fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    pub fn env(&self, name: &str) -> Environment {
        self.envs
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .unwrap()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Number of calls of any kind
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Deploy targets in the order deploys started
    pub fn deployed(&self) -> Vec<String> {
        self.deployed.lock().unwrap().clone()
    }

    pub fn workload_request(&self, name: &str) -> Option<DeployWorkloadRequest> {
        self.workload_requests
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, req)| req.clone())
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_app(&self, app: &str) -> ClientResult<()> {
        if app != self.app {
            return Err(ClientError::NotFound(format!("application {}", app)));
        }
        Ok(())
    }

    fn outcome(
        &self,
        app: &str,
        env: &str,
        workload: Option<&str>,
    ) -> std::result::Result<Deployment, DeployError> {
        let target = match workload {
            Some(name) => format!("{}/{}", env, name),
            None => env.to_string(),
        };
        self.deployed.lock().unwrap().push(target.clone());

        if self.no_changes.contains(&target) {
            return Err(DeployError::from_client(
                target,
                ClientError::api_error(409, "no changes"),
            ));
        }
        if self.failing.contains(&target) {
            return Err(DeployError::from_client(
                target,
                ClientError::api_error(500, "stack rollback"),
            ));
        }

        Ok(deployment(app, env, workload, DeploymentStatus::Succeeded))
    }
}

/// A deployment record started now
pub fn deployment(
    app: &str,
    env: &str,
    workload: Option<&str>,
    status: DeploymentStatus,
) -> Deployment {
    Deployment {
        id: Uuid::new_v4(),
        app: app.to_string(),
        env: env.to_string(),
        workload: workload.map(str::to_string),
        status,
        started_at: Utc::now(),
        completed_at: None,
        message: None,
    }
}

#[async_trait]
impl WorkloadCatalog for FakeStore {
    async fn list_workloads(&self, app: &str) -> ClientResult<Vec<WorkloadSummary>> {
        self.touch();
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.catalog_down {
            return Err(ClientError::api_error(503, "store unavailable"));
        }
        self.check_app(app)?;
        Ok(self
            .workloads
            .iter()
            .cloned()
            .map(WorkloadSummary::from)
            .collect())
    }
}

#[async_trait]
impl ConfigStore for FakeStore {
    async fn applications(&self) -> ClientResult<Vec<Application>> {
        self.touch();
        Ok(vec![Application {
            name: self.app.clone(),
            domain: None,
            created_at: Utc::now(),
            tags: Vec::new(),
        }])
    }

    async fn application(&self, app: &str) -> ClientResult<Application> {
        self.check_app(app)?;
        let mut apps = self.applications().await?;
        Ok(apps.remove(0))
    }

    async fn environments(&self, app: &str) -> ClientResult<Vec<Environment>> {
        self.touch();
        self.check_app(app)?;
        Ok(self.envs.clone())
    }

    async fn environment(&self, app: &str, env: &str) -> ClientResult<Environment> {
        self.touch();
        self.check_app(app)?;
        self.envs
            .iter()
            .find(|e| e.name == env)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("environment {}", env)))
    }

    async fn workloads(&self, app: &str) -> ClientResult<Vec<Workload>> {
        self.touch();
        self.check_app(app)?;
        Ok(self.workloads.clone())
    }

    async fn workload(&self, app: &str, name: &str) -> ClientResult<Workload> {
        self.touch();
        self.check_app(app)?;
        self.workloads
            .iter()
            .find(|w| w.name == name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("workload {}", name)))
    }

    async fn workload_status(&self, app: &str, env: &str, name: &str) -> ClientResult<WorkloadStatus> {
        let workload = self.workload(app, name).await?;
        self.environment(app, env).await?;
        Ok(WorkloadStatus {
            app: app.to_string(),
            env: env.to_string(),
            name: workload.name,
            desired_count: 2,
            running_count: 1,
            image: Some("api:1.4.0".to_string()),
            endpoint: None,
            last_deployment: None,
        })
    }

    async fn deployments(&self, app: &str, env: Option<&str>) -> ClientResult<Vec<Deployment>> {
        self.touch();
        self.check_app(app)?;
        Ok(self
            .deployments
            .iter()
            .filter(|d| env.is_none_or(|env| d.env == env))
            .cloned()
            .collect())
    }

    async fn deployment(&self, id: Uuid) -> ClientResult<Deployment> {
        self.touch();
        self.deployments
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("deployment {}", id)))
    }
}

#[async_trait]
impl Deployer for FakeStore {
    async fn deploy_environment(
        &self,
        app: &str,
        env: &str,
        _req: &DeployEnvironmentRequest,
    ) -> std::result::Result<Deployment, DeployError> {
        self.touch();
        self.outcome(app, env, None)
    }

    async fn deploy_workload(
        &self,
        app: &str,
        env: &str,
        name: &str,
        req: &DeployWorkloadRequest,
    ) -> std::result::Result<Deployment, DeployError> {
        self.touch();
        self.workload_requests
            .lock()
            .unwrap()
            .push((name.to_string(), req.clone()));
        // let concurrent deploys of one group interleave
        tokio::task::yield_now().await;
        self.outcome(app, env, Some(name))
    }
}

/// Prompter answering from queued answers
#[derive(Default)]
pub struct ScriptedPrompter {
    selects: Mutex<VecDeque<String>>,
    multi_selects: Mutex<VecDeque<Vec<String>>>,
    confirms: Mutex<VecDeque<bool>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, answer: &str) -> Self {
        self.selects.lock().unwrap().push_back(answer.to_string());
        self
    }

    pub fn multi_select(self, answer: &[&str]) -> Self {
        self.multi_selects
            .lock()
            .unwrap()
            .push_back(answer.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn confirm(self, answer: bool) -> Self {
        self.confirms.lock().unwrap().push_back(answer);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, _flag: &str, options: &[String]) -> Result<String> {
        let Some(answer) = self.selects.lock().unwrap().pop_front() else {
            bail!("unexpected prompt: {}", message);
        };
        assert!(options.contains(&answer), "{} not offered", answer);
        Ok(answer)
    }

    fn multi_select(&self, message: &str, _flag: &str, _options: &[String]) -> Result<Vec<String>> {
        match self.multi_selects.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("unexpected prompt: {}", message),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        match self.confirms.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("unexpected prompt: {}", message),
        }
    }
}

pub fn session(store: Arc<FakeStore>, prompter: impl Prompter + 'static) -> Session {
    session_with(store, prompter, None)
}

pub fn session_with(
    store: Arc<FakeStore>,
    prompter: impl Prompter + 'static,
    workspace: Option<Workspace>,
) -> Session {
    Session {
        config: Config::default(),
        store: store.clone(),
        deployer: store,
        prompter: Arc::new(prompter),
        workspace,
    }
}
