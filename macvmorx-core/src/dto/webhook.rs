//! GitHub `workflow_job` webhook payload
//!
//! Only the fields the orchestrator consumes are modeled; GitHub sends far
//! more and serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Top-level `workflow_job` event body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJobEvent {
    /// Event action: "queued", "in_progress", "completed", "cancelled", ...
    pub action: String,

    /// The workflow job the event refers to
    pub workflow_job: WorkflowJob,
}

/// The job portion of a `workflow_job` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJob {
    /// Job id assigned by GitHub
    pub id: i64,

    /// Job name as written in the workflow file
    #[serde(default)]
    pub name: String,

    /// Runner labels the job requests (e.g. "self-hosted", "macos-image-runner-v1")
    #[serde(default)]
    pub labels: Vec<String>,

    /// Id of the runner that picked up the job, present on completion events
    #[serde(default)]
    pub runner_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_queued_event() {
        let body = r#"{
            "action": "queued",
            "workflow_job": {
                "id": 42,
                "name": "build",
                "labels": ["self-hosted", "macos-image-runner-v1"]
            }
        }"#;

        let event: WorkflowJobEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.action, "queued");
        assert_eq!(event.workflow_job.id, 42);
        assert_eq!(event.workflow_job.labels.len(), 2);
        assert!(event.workflow_job.runner_id.is_none());
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let body = r#"{
            "action": "completed",
            "workflow_job": {"id": 7, "runner_id": 99, "conclusion": "success"},
            "repository": {"full_name": "acme/widgets"}
        }"#;

        let event: WorkflowJobEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.action, "completed");
        assert_eq!(event.workflow_job.runner_id, Some(99));
    }
}
