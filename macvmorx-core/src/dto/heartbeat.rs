//! Heartbeat payload sent by worker-node agents
//!
//! Agents push a full snapshot of their node on every heartbeat; the
//! orchestrator replaces its record wholesale rather than merging fields.

use serde::{Deserialize, Serialize};

/// Details of a single VM running on a worker node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmInfo {
    /// Unique ID of the VM (by convention `vm-<jobId>`)
    pub vm_id: String,

    /// Name of the image the VM was booted from
    pub image_name: String,

    /// How long the VM has been running, in seconds
    pub runtime_seconds: i64,

    /// Hostname the VM reports for itself
    pub vm_hostname: String,

    /// IP address assigned to the VM
    pub vm_ip_address: String,
}

/// Snapshot of a worker node, pushed periodically by its agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatPayload {
    /// Unique identifier for the node, chosen by the worker (typically a hostname)
    pub node_id: String,

    /// Number of VMs currently running on the node
    pub vm_count: u32,

    /// Details of the running VMs
    pub vms: Vec<VmInfo>,

    /// Current CPU usage percentage
    pub cpu_usage_percent: f64,

    /// Current memory usage in GB
    #[serde(rename = "memoryUsageGB")]
    pub memory_usage_gb: f64,

    /// Total memory in GB
    #[serde(rename = "totalMemoryGB")]
    pub total_memory_gb: f64,

    /// Current disk usage in GB
    #[serde(rename = "diskUsageGB")]
    pub disk_usage_gb: f64,

    /// Total disk space in GB
    #[serde(rename = "totalDiskGB")]
    pub total_disk_gb: f64,

    /// General status reported by the agent (e.g. "healthy", "warning")
    pub status: String,

    /// Image names cached locally on the node
    pub cached_images: Vec<String>,
}
