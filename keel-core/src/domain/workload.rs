//! Workload domain model
//!
//! A workload is a deployable unit of an application: either a long-running
//! service or a job triggered on a schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A workload registered in the configuration store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workload {
    /// Application the workload belongs to
    pub app: String,

    /// Workload name, unique within the application
    pub name: String,

    /// Kind of workload, decides which infrastructure template is used
    pub kind: WorkloadKind,

    /// When the workload was first registered
    pub created_at: DateTime<Utc>,
}

/// Kind of a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    /// Internet-facing service behind a load balancer
    LoadBalancedWebService,

    /// Service reachable only from inside the environment
    BackendService,

    /// Service consuming messages from a queue
    WorkerService,

    /// Web service scaled per request
    RequestDrivenWebService,

    /// Task started on a schedule
    ScheduledJob,
}

impl WorkloadKind {
    /// All known kinds, services first
    pub const ALL: [WorkloadKind; 5] = [
        WorkloadKind::LoadBalancedWebService,
        WorkloadKind::BackendService,
        WorkloadKind::WorkerService,
        WorkloadKind::RequestDrivenWebService,
        WorkloadKind::ScheduledJob,
    ];

    /// Whether this kind is a long-running service
    pub fn is_service(&self) -> bool {
        !self.is_job()
    }

    /// Whether this kind is a job
    pub fn is_job(&self) -> bool {
        matches!(self, WorkloadKind::ScheduledJob)
    }

    /// Human readable name, as written in manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::LoadBalancedWebService => "Load Balanced Web Service",
            WorkloadKind::BackendService => "Backend Service",
            WorkloadKind::WorkerService => "Worker Service",
            WorkloadKind::RequestDrivenWebService => "Request-Driven Web Service",
            WorkloadKind::ScheduledJob => "Scheduled Job",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known workload kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workload type '{0}'")]
pub struct UnknownWorkloadKind(pub String);

impl FromStr for WorkloadKind {
    type Err = UnknownWorkloadKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkloadKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWorkloadKind(s.to_string()))
    }
}

/// Runtime status of a workload in one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadStatus {
    pub app: String,
    pub env: String,
    pub name: String,
    pub desired_count: u32,
    pub running_count: u32,
    pub image: Option<String>,
    pub endpoint: Option<String>,
    pub last_deployment: Option<super::deployment::Deployment>,
}
