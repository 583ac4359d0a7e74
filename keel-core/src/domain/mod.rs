//! Core domain types
//!
//! This module contains the core domain structures used across Keel crates.
//! They mirror what the control plane stores for each application and are
//! shared between the client (deserializes) and the CLI (renders).

pub mod application;
pub mod deployment;
pub mod environment;
pub mod workload;
