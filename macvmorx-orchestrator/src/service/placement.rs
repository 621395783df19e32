//! Placement and agent dispatch
//!
//! A queued job is placed by selecting a node under a registry-wide mutex and
//! dispatching a provision command to its agent. The mutex spans selection
//! plus the outbound RPC: a concurrent placement sees the first decision's
//! effect only after the first dispatch completes, so two tasks observing the
//! same spare capacity cannot double-book a node's VM cap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use macvmorx_agent_client::{AgentClient, AgentError};
use macvmorx_core::domain::job::{JobState, JobStatus};
use macvmorx_core::domain::node::NodeStatus;
use macvmorx_core::dto::provision::VmProvisionCommand;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::registry::{JobRegistry, NodeRegistry};

/// Deadline for one job's placement attempt, including the agent RPC
pub const PLACEMENT_DEADLINE: Duration = Duration::from_secs(300);

/// Why a placement attempt failed
#[derive(Debug, Error)]
pub enum PlacementError {
    /// No online node with spare VM capacity exists
    #[error("no suitable node found for VM scheduling")]
    NoSuitableNode,

    /// The chosen agent rejected or never answered the provision command
    #[error(transparent)]
    Dispatch(#[from] AgentError),
}

/// Selects nodes for queued jobs and dispatches provision commands
pub struct Placer {
    nodes: Arc<NodeRegistry>,
    jobs: Arc<JobRegistry>,
    agent: AgentClient,
    /// Serializes placement decisions; held across the dispatch RPC
    lock: Mutex<()>,
}

impl Placer {
    /// Creates a placer over the shared registries
    pub fn new(nodes: Arc<NodeRegistry>, jobs: Arc<JobRegistry>, agent: AgentClient) -> Self {
        Self {
            nodes,
            jobs,
            agent,
            lock: Mutex::new(()),
        }
    }

    /// Places a queued job and records the outcome in the job registry
    ///
    /// Runs the whole attempt under [`PLACEMENT_DEADLINE`]; on success the
    /// job moves to `provisioning`, on any failure (no candidate, dispatch
    /// error, deadline) it moves to `failed` with an end time. Never returns
    /// an error: placement outcomes surface only in job state and logs.
    pub async fn place_job(&self, job_id: i64, labels: Vec<String>, image_name: String, token: String) {
        let attempt = tokio::time::timeout(
            PLACEMENT_DEADLINE,
            self.schedule_vm(job_id, &labels, &image_name, &token),
        )
        .await;

        match attempt {
            Ok(Ok(node_id)) => {
                tracing::info!("VM for job {} scheduled on node {}", job_id, node_id);
            }
            Ok(Err(err)) => {
                tracing::warn!("Failed to place job {}: {}", job_id, err);
                self.mark_failed(job_id);
            }
            Err(_) => {
                tracing::warn!(
                    "Placement for job {} exceeded the {}s deadline",
                    job_id,
                    PLACEMENT_DEADLINE.as_secs()
                );
                self.mark_failed(job_id);
            }
        }
    }

    /// Selects a node and instructs its agent to provision the job's VM
    ///
    /// Holds the placer lock for the candidate scan plus the dispatch RPC.
    async fn schedule_vm(
        &self,
        job_id: i64,
        labels: &[String],
        image_name: &str,
        token: &str,
    ) -> Result<String, PlacementError> {
        let _guard = self.lock.lock().await;

        tracing::info!(
            "Attempting to schedule VM for job {}, image: {}, labels: {:?}",
            job_id,
            image_name,
            labels
        );

        let candidates = self.nodes.list();
        let target = select_node(&candidates, image_name).ok_or(PlacementError::NoSuitableNode)?;
        let node_id = target.heartbeat.node_id.clone();

        // Node id, job id, and a timestamp keep runner names collision-free.
        let runner_name = format!(
            "macvmorx-runner-{}-{}-{}",
            node_id,
            job_id,
            Local::now().format("%y%m%d%H%M%S")
        );

        let command = VmProvisionCommand {
            vm_id: JobStatus::vm_id_for(job_id),
            image_name: image_name.to_string(),
            runner_registration_token: token.to_string(),
            runner_name: runner_name.clone(),
            runner_labels: labels.to_vec(),
        };

        self.agent.provision_vm(&node_id, &command).await?;

        self.jobs.update(job_id, |job| {
            job.status = JobState::Provisioning;
            job.node_id = Some(node_id.clone());
            job.vm_id = Some(command.vm_id.clone());
            job.runner_name = runner_name.clone();
            job.provisioning_start_time = Some(Utc::now());
        });

        Ok(node_id)
    }

    fn mark_failed(&self, job_id: i64) {
        self.jobs.update(job_id, |job| {
            job.status = JobState::Failed;
            job.end_time = Some(Utc::now());
        });
    }
}

/// Picks the target node for an image from a registry snapshot
///
/// First pass prefers an online node with spare capacity that already has
/// the image cached; second pass takes any online node with spare capacity,
/// which will download the image. First match in enumeration order wins;
/// enumeration order is arbitrary.
fn select_node<'a>(nodes: &'a [NodeStatus], image_name: &str) -> Option<&'a NodeStatus> {
    if let Some(node) = nodes
        .iter()
        .find(|n| n.is_online && n.has_capacity() && n.has_image_cached(image_name))
    {
        tracing::info!(
            "Found suitable node {} with image {} cached",
            node.heartbeat.node_id,
            image_name
        );
        return Some(node);
    }

    let fallback = nodes.iter().find(|n| n.is_online && n.has_capacity());
    if let Some(node) = fallback {
        tracing::info!(
            "Found available node {} that can download image {}",
            node.heartbeat.node_id,
            image_name
        );
    }
    fallback
}
