//! macvmorx Core
//!
//! Core types and abstractions for the macvmorx orchestrator.
//!
//! This crate contains:
//! - Domain types: fleet state entities (NodeStatus, JobStatus)
//! - DTOs: wire payloads exchanged with agents and the CI provider

pub mod domain;
pub mod dto;
