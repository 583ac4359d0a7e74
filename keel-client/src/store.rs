//! Collaborator traits
//!
//! The CLI talks to the control plane only through these traits so command
//! logic can be exercised against in-memory implementations.

use async_trait::async_trait;
use keel_core::domain::application::Application;
use keel_core::domain::deployment::Deployment;
use keel_core::domain::environment::Environment;
use keel_core::domain::workload::{Workload, WorkloadStatus};
use keel_core::dto::environment::DeployEnvironmentRequest;
use keel_core::dto::workload::{DeployWorkloadRequest, WorkloadSummary};
use uuid::Uuid;

use crate::KeelClient;
use crate::error::{DeployError, Result};

/// Read-only registry of the workloads known for an application
#[async_trait]
pub trait WorkloadCatalog: Send + Sync {
    /// List every workload of `app` with its declared type
    async fn list_workloads(&self, app: &str) -> Result<Vec<WorkloadSummary>>;
}

/// Configuration store: applications, environments, workloads and the
/// records and status the control plane keeps about them
#[async_trait]
pub trait ConfigStore: WorkloadCatalog {
    async fn applications(&self) -> Result<Vec<Application>>;

    async fn application(&self, app: &str) -> Result<Application>;

    async fn environments(&self, app: &str) -> Result<Vec<Environment>>;

    async fn environment(&self, app: &str, env: &str) -> Result<Environment>;

    async fn workloads(&self, app: &str) -> Result<Vec<Workload>>;

    async fn workload(&self, app: &str, name: &str) -> Result<Workload>;

    async fn workload_status(&self, app: &str, env: &str, name: &str) -> Result<WorkloadStatus>;

    /// Deployment history, optionally restricted to one environment
    async fn deployments(&self, app: &str, env: Option<&str>) -> Result<Vec<Deployment>>;

    async fn deployment(&self, id: Uuid) -> Result<Deployment>;
}

/// Creates or updates infrastructure
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Deploy the shared infrastructure of `env`
    async fn deploy_environment(
        &self,
        app: &str,
        env: &str,
        req: &DeployEnvironmentRequest,
    ) -> std::result::Result<Deployment, DeployError>;

    /// Deploy workload `name` into `env`
    async fn deploy_workload(
        &self,
        app: &str,
        env: &str,
        name: &str,
        req: &DeployWorkloadRequest,
    ) -> std::result::Result<Deployment, DeployError>;
}

#[async_trait]
impl WorkloadCatalog for KeelClient {
    async fn list_workloads(&self, app: &str) -> Result<Vec<WorkloadSummary>> {
        let workloads = KeelClient::list_workloads(self, app).await?;
        Ok(workloads.into_iter().map(WorkloadSummary::from).collect())
    }
}

#[async_trait]
impl ConfigStore for KeelClient {
    async fn applications(&self) -> Result<Vec<Application>> {
        self.list_applications().await
    }

    async fn application(&self, app: &str) -> Result<Application> {
        self.get_application(app).await
    }

    async fn environments(&self, app: &str) -> Result<Vec<Environment>> {
        self.list_environments(app).await
    }

    async fn environment(&self, app: &str, env: &str) -> Result<Environment> {
        self.get_environment(app, env).await
    }

    async fn workloads(&self, app: &str) -> Result<Vec<Workload>> {
        KeelClient::list_workloads(self, app).await
    }

    async fn workload(&self, app: &str, name: &str) -> Result<Workload> {
        self.get_workload(app, name).await
    }

    async fn workload_status(&self, app: &str, env: &str, name: &str) -> Result<WorkloadStatus> {
        KeelClient::workload_status(self, app, env, name).await
    }

    async fn deployments(&self, app: &str, env: Option<&str>) -> Result<Vec<Deployment>> {
        self.list_deployments(app, env).await
    }

    async fn deployment(&self, id: Uuid) -> Result<Deployment> {
        self.get_deployment(id).await
    }
}

#[async_trait]
impl Deployer for KeelClient {
    async fn deploy_environment(
        &self,
        app: &str,
        env: &str,
        req: &DeployEnvironmentRequest,
    ) -> std::result::Result<Deployment, DeployError> {
        KeelClient::deploy_environment(self, app, env, req)
            .await
            .map_err(|e| DeployError::from_client(env, e))
    }

    async fn deploy_workload(
        &self,
        app: &str,
        env: &str,
        name: &str,
        req: &DeployWorkloadRequest,
    ) -> std::result::Result<Deployment, DeployError> {
        KeelClient::deploy_workload(self, app, env, name, req)
            .await
            .map_err(|e| DeployError::from_client(format!("{}/{}", env, name), e))
    }
}
