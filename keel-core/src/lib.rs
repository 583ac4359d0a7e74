//! Keel Core
//!
//! Core types and abstractions for the Keel deployment tool.
//!
//! This crate contains:
//! - Domain types: applications, environments, workloads and deployments
//! - DTOs: request/response shapes exchanged with the control plane
//! - Deploy order: parsing `name/N` tokens and grouping workloads into
//!   sequential deployment stages

pub mod domain;
pub mod dto;
pub mod order;
