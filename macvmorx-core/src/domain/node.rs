//! Worker node domain model
//!
//! Represents a Mac Mini worker as seen by the orchestrator: the most recent
//! heartbeat snapshot plus liveness bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::heartbeat::HeartbeatPayload;

/// Hard cap on VMs a single node may host simultaneously
pub const MAX_VMS_PER_NODE: u32 = 2;

/// Current state of a worker node, maintained by the orchestrator
///
/// The heartbeat snapshot is flattened into the record so the wire shape is
/// the heartbeat fields plus `lastSeen` and `isOnline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Most recent heartbeat from the node's agent
    #[serde(flatten)]
    pub heartbeat: HeartbeatPayload,

    /// Timestamp of the last received heartbeat
    pub last_seen: DateTime<Utc>,

    /// True if the node is considered online
    ///
    /// Derived from `last_seen` at read time, never authoritative on its own.
    pub is_online: bool,
}

impl NodeStatus {
    /// Whether the node had the given image cached as of its last heartbeat
    pub fn has_image_cached(&self, image_name: &str) -> bool {
        self.heartbeat
            .cached_images
            .iter()
            .any(|cached| cached == image_name)
    }

    /// Whether the node can take on another VM
    pub fn has_capacity(&self) -> bool {
        self.heartbeat.vm_count < MAX_VMS_PER_NODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(vm_count: u32, cached_images: Vec<String>) -> NodeStatus {
        NodeStatus {
            heartbeat: HeartbeatPayload {
                node_id: "mini-01".to_string(),
                vm_count,
                cached_images,
                ..Default::default()
            },
            last_seen: Utc::now(),
            is_online: true,
        }
    }

    #[test]
    fn test_has_image_cached_exact_match() {
        let node = node(0, vec!["runner-v1".to_string()]);
        assert!(node.has_image_cached("runner-v1"));
        assert!(!node.has_image_cached("runner-v2"));
        assert!(!node.has_image_cached("runner"));
    }

    #[test]
    fn test_has_capacity_respects_cap() {
        assert!(node(0, vec![]).has_capacity());
        assert!(node(1, vec![]).has_capacity());
        assert!(!node(2, vec![]).has_capacity());
    }

    #[test]
    fn test_node_status_flattens_heartbeat_fields() {
        let value = serde_json::to_value(node(1, vec![])).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("nodeId"));
        assert!(object.contains_key("vmCount"));
        assert!(object.contains_key("lastSeen"));
        assert!(object.contains_key("isOnline"));
    }
}
