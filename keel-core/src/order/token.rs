//! Workload tokens
//!
//! A token is what the user types on the command line: `api` or `api/2`.

use std::fmt;
use std::str::FromStr;

use super::OrderError;

/// A workload name with an optional deploy order tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadToken {
    pub name: String,
    pub ordinal: Option<u32>,
}

impl WorkloadToken {
    /// Untagged token, deployed after every tagged one
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal: None,
        }
    }

    /// Token deployed with the group for `ordinal`
    pub fn ordered(name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            ordinal: Some(ordinal),
        }
    }

    /// Parse `name` or `name/N`
    ///
    /// # Errors
    /// Returns `OrderError::InvalidOrderTag` if the name is empty or the
    /// suffix after `/` is not a base-10 non-negative integer fitting in `u32`.
    pub fn parse(token: &str) -> Result<Self, OrderError> {
        let trimmed = token.trim();

        let Some((name, suffix)) = trimmed.split_once('/') else {
            if trimmed.is_empty() {
                return Err(OrderError::invalid_tag(token, "workload name is empty"));
            }
            return Ok(Self::new(trimmed));
        };

        if name.is_empty() {
            return Err(OrderError::invalid_tag(token, "workload name is empty"));
        }

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderError::invalid_tag(
                token,
                format!("'{}' is not a non-negative integer", suffix),
            ));
        }

        let ordinal = suffix
            .parse::<u32>()
            .map_err(|_| OrderError::invalid_tag(token, format!("'{}' is too large", suffix)))?;

        Ok(Self::ordered(name, ordinal))
    }
}

impl FromStr for WorkloadToken {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WorkloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordinal {
            Some(ordinal) => write!(f, "{}/{}", self.name, ordinal),
            None => write!(f, "{}", self.name),
        }
    }
}
