//! Heartbeat ingestion
//!
//! A heartbeat does two things: it replaces the node's registry record, and
//! it is the only feedback channel for provisioned VMs, so each VM entry may
//! advance a tracked job to running.

use chrono::Utc;
use macvmorx_core::domain::job::JobState;
use macvmorx_core::dto::heartbeat::HeartbeatPayload;

use crate::registry::{JobRegistry, NodeRegistry};

/// Applies a heartbeat payload to fleet state
///
/// The node record is replaced wholesale. Every VM entry whose id parses to
/// a job id then drives that job to `running`; entries that do not parse are
/// skipped without failing the heartbeat.
pub fn apply_heartbeat(nodes: &NodeRegistry, jobs: &JobRegistry, payload: HeartbeatPayload) {
    tracing::info!(
        "Received heartbeat from node {}: {} VM(s), CPU {:.2}%, cached images: {:?}",
        payload.node_id,
        payload.vm_count,
        payload.cpu_usage_percent,
        payload.cached_images
    );

    let node_id = payload.node_id.clone();
    let vms = payload.vms.clone();
    nodes.upsert(payload);

    for vm in vms {
        let Some(job_id) = parse_job_id(&vm.vm_id) else {
            tracing::warn!("Could not parse job id from VM id '{}', skipping entry", vm.vm_id);
            continue;
        };

        jobs.update(job_id, |job| {
            // A placer-declared failure stays failed; only a terminal
            // webhook may overwrite it.
            if job.status == JobState::Failed {
                return;
            }
            job.status = JobState::Running;
            job.node_id = Some(node_id.clone());
            job.vm_id = Some(vm.vm_id.clone());
            job.vm_ip_address = Some(vm.vm_ip_address.clone());
            if job.vm_start_time.is_none() {
                job.vm_start_time = Some(Utc::now());
            }
        });
    }
}

/// Extracts a job id from a VM id
///
/// `vm-<digits>` yields the digits; otherwise the whole id must parse as a
/// decimal integer.
pub fn parse_job_id(vm_id: &str) -> Option<i64> {
    match vm_id.strip_prefix("vm-") {
        Some(suffix) => suffix.parse().ok(),
        None => vm_id.parse().ok(),
    }
}
