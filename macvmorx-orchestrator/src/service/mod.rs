//! Orchestrator services
//!
//! Business logic between the HTTP layer and the registries:
//! - heartbeat: applies agent heartbeats and derives job progress
//! - placement: node selection and agent dispatch for queued jobs
//! - monitor: background sweep that reports offline nodes

pub mod heartbeat;
pub mod monitor;
pub mod placement;
