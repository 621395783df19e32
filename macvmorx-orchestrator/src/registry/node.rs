//! Node registry
//!
//! Tracks every worker node that has ever sent a heartbeat. Nodes are never
//! deleted; a silent node flips to offline when read.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use macvmorx_core::domain::node::NodeStatus;
use macvmorx_core::dto::heartbeat::HeartbeatPayload;

/// In-memory table of worker nodes, keyed by node id
pub struct NodeRegistry {
    nodes: DashMap<String, NodeStatus>,
    offline_timeout: chrono::Duration,
}

impl NodeRegistry {
    /// Creates a registry that flips nodes offline after `offline_timeout`
    /// without a heartbeat
    pub fn new(offline_timeout: Duration) -> Self {
        Self {
            nodes: DashMap::new(),
            offline_timeout: chrono::Duration::from_std(offline_timeout)
                .unwrap_or_else(|_| chrono::Duration::seconds(45)),
        }
    }

    /// Replaces the node's record with the heartbeat contents
    ///
    /// Stamps `last_seen = now`. Unknown nodes are created; there is no
    /// pre-registration. Idempotent under replay.
    pub fn upsert(&self, payload: HeartbeatPayload) {
        let node_id = payload.node_id.clone();
        let status = NodeStatus {
            heartbeat: payload,
            last_seen: Utc::now(),
            is_online: true,
        };
        self.nodes.insert(node_id, status);
    }

    /// Returns a snapshot of one node with `is_online` recomputed
    pub fn get(&self, node_id: &str) -> Option<NodeStatus> {
        self.nodes.get(node_id).map(|entry| {
            let mut node = entry.clone();
            node.is_online = self.online_at(node.last_seen, Utc::now());
            node
        })
    }

    /// Returns point-in-time snapshots of all nodes with `is_online`
    /// recomputed
    ///
    /// Iteration order is arbitrary. Callers get copies and must not assume
    /// later mutations are visible.
    pub fn list(&self) -> Vec<NodeStatus> {
        let now = Utc::now();
        self.nodes
            .iter()
            .map(|entry| {
                let mut node = entry.clone();
                node.is_online = self.online_at(node.last_seen, now);
                node
            })
            .collect()
    }

    /// Liveness rule: a node is online while `now - last_seen` is within the
    /// offline timeout, boundary inclusive
    fn online_at(&self, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_seen) <= self.offline_timeout
    }
}
