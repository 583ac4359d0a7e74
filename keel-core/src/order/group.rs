//! Deployment grouping
//!
//! Turns tokens into an ordered list of groups. Groups run one after the
//! other; members of one group have no ordering between them.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{OrderError, WorkloadToken};

/// Workloads that may be deployed at the same time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentGroup {
    /// Order tag shared by the members, `None` for the trailing untagged group
    ordinal: Option<u32>,
    members: BTreeSet<String>,
}

impl DeploymentGroup {
    pub fn ordinal(&self) -> Option<u32> {
        self.ordinal
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false, groups are never built empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

/// Ordered sequence of deployment groups for one `deploy` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeploymentPlan {
    groups: Vec<DeploymentGroup>,
}

impl DeploymentPlan {
    pub fn groups(&self) -> &[DeploymentGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<DeploymentGroup> {
        self.groups
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every workload in execution order
    pub fn workloads(&self) -> Vec<&str> {
        self.groups.iter().flat_map(DeploymentGroup::iter).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group.contains(name))
    }
}

/// Group workloads for deployment
///
/// # Arguments
/// * `tokens` - Workloads named explicitly, with optional order tags
/// * `remaining` - Catalog listing when every workload should be deployed;
///   names not already in `tokens` join the untagged group
///
/// # Returns
/// Groups with an order tag in ascending tag order, followed by one group
/// of untagged workloads if there are any. Each workload appears once.
/// If a name is tagged more than once the last tag wins; callers wanting
/// that rejected run [`super::validate_tokens`] first.
///
/// # Errors
/// Returns `OrderError::EmptyWorkloadSet` when nothing is selected.
pub fn group_workloads(
    tokens: &[WorkloadToken],
    remaining: Option<&[String]>,
) -> Result<DeploymentPlan, OrderError> {
    if tokens.is_empty() && remaining.is_none() {
        return Err(OrderError::EmptyWorkloadSet);
    }

    let mut assigned: HashMap<&str, Option<u32>> = HashMap::new();
    for token in tokens {
        assigned.insert(&token.name, token.ordinal);
    }

    let mut ordered: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
    let mut unordered: BTreeSet<String> = BTreeSet::new();
    for (name, ordinal) in &assigned {
        match ordinal {
            Some(ordinal) => {
                ordered.entry(*ordinal).or_default().insert(name.to_string());
            }
            None => {
                unordered.insert(name.to_string());
            }
        }
    }

    if let Some(catalog) = remaining {
        let named: HashSet<&str> = assigned.keys().copied().collect();
        unordered.extend(
            catalog
                .iter()
                .filter(|name| !named.contains(name.as_str()))
                .cloned(),
        );
    }

    let mut groups: Vec<DeploymentGroup> = ordered
        .into_iter()
        .map(|(ordinal, members)| DeploymentGroup {
            ordinal: Some(ordinal),
            members,
        })
        .collect();

    if !unordered.is_empty() {
        groups.push(DeploymentGroup {
            ordinal: None,
            members: unordered,
        });
    }

    if groups.is_empty() {
        return Err(OrderError::EmptyWorkloadSet);
    }

    Ok(DeploymentPlan { groups })
}
