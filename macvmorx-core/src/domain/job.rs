//! CI job domain model
//!
//! A job is created when the CI provider reports a queued workflow job and
//! tracked through provisioning, runtime, and completion. Records are never
//! deleted; a terminal state freezes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked CI job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Created from a queued webhook event, awaiting placement
    Queued,

    /// A provision command was accepted by an agent
    Provisioning,

    /// A heartbeat observed the job's VM running
    Running,

    /// The CI provider reported the job completed
    Completed,

    /// The CI provider reported the job cancelled
    Cancelled,

    /// The CI provider reported the job skipped
    Skipped,

    /// Placement found no node or the agent dispatch failed
    Failed,
}

impl JobState {
    /// Maps a terminal webhook action string to its state
    ///
    /// Returns `None` for actions that do not terminate a job.
    pub fn from_terminal_action(action: &str) -> Option<JobState> {
        match action {
            "completed" => Some(JobState::Completed),
            "cancelled" => Some(JobState::Cancelled),
            "skipped" => Some(JobState::Skipped),
            _ => None,
        }
    }

    /// Whether this state ends the job's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Skipped | JobState::Failed
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Queued => "queued",
            JobState::Provisioning => "provisioning",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Cancelled => "cancelled",
            JobState::Skipped => "skipped",
            JobState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Tracked state of a single CI workflow job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Job id assigned by the CI provider
    pub job_id: i64,

    /// Runner name generated at placement time, empty until placed
    pub runner_name: String,

    /// VM image the job requested via its labels
    pub image_name: String,

    /// Current lifecycle state
    pub status: JobState,

    /// Node the job was placed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// VM id, always `vm-<jobId>` once placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,

    /// IP of the job's VM, learned from heartbeats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_ip_address: Option<String>,

    /// Runner labels the job requested
    pub labels: Vec<String>,

    /// When the queued webhook arrived
    pub queue_time: DateTime<Utc>,

    /// When the provision command was accepted by an agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_start_time: Option<DateTime<Utc>>,

    /// When a heartbeat first observed the VM running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_start_time: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl JobStatus {
    /// Creates a freshly queued job record
    pub fn queued(job_id: i64, image_name: String, labels: Vec<String>) -> Self {
        Self {
            job_id,
            runner_name: String::new(),
            image_name,
            status: JobState::Queued,
            node_id: None,
            vm_id: None,
            vm_ip_address: None,
            labels,
            queue_time: Utc::now(),
            provisioning_start_time: None,
            vm_start_time: None,
            end_time: None,
        }
    }

    /// The deterministic VM id for a job
    pub fn vm_id_for(job_id: i64) -> String {
        format!("vm-{job_id}")
    }
}
