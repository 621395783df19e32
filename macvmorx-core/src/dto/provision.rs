//! VM provision command sent to worker-node agents

use serde::{Deserialize, Serialize};

/// Instruction for an agent to boot a VM hosting a CI runner
///
/// The orchestrator fires this at the agent and gets no further reply; the
/// VM's existence is confirmed by the node's next heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmProvisionCommand {
    /// ID the new VM must use, always `vm-<jobId>`
    pub vm_id: String,

    /// Image to boot the VM from
    pub image_name: String,

    /// Token the VM uses to register itself as a self-hosted runner
    pub runner_registration_token: String,

    /// Unique runner name for the CI provider
    pub runner_name: String,

    /// Labels the runner advertises, copied from the triggering job
    pub runner_labels: Vec<String>,
}
