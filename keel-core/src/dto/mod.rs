//! Data Transfer Objects for control plane communication
//!
//! This module contains the request bodies sent to the control plane and
//! the lightweight listings it returns.

pub mod environment;
pub mod workload;
