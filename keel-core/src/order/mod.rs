//! Deploy order
//!
//! Workloads passed to `keel deploy` may carry an order tag, `name/N`.
//! Tagged workloads are deployed in ascending tag order, workloads sharing
//! a tag are deployed together, and untagged workloads go last.
//!
//! Everything here is pure: the catalog listing used by `--all` is fetched
//! by the caller and handed to [`group_workloads`].

mod error;
mod group;
mod token;
mod validate;

pub use error::OrderError;
pub use group::{DeploymentGroup, DeploymentPlan, group_workloads};
pub use token::WorkloadToken;
pub use validate::{DEFAULT_MAX_ORDINAL, validate_tokens};
