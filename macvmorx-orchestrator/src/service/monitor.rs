//! Offline sweeper
//!
//! Periodically scans the node registry and reports nodes whose derived
//! online flag is false. Nodes are never deleted, and jobs on a lost node
//! are left untouched; failing them is a deliberate extension point.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::registry::NodeRegistry;

/// Runs the offline sweep loop until the task is dropped
pub async fn run_offline_monitor(nodes: Arc<NodeRegistry>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick of a tokio interval fires immediately; skip it so the
    // loop reports on a steady cadence like a plain ticker.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        for node in nodes.list() {
            if !node.is_online {
                let silent_secs = Utc::now()
                    .signed_duration_since(node.last_seen)
                    .num_seconds();
                tracing::warn!(
                    "Node {} is considered OFFLINE (last seen {}s ago)",
                    node.heartbeat.node_id,
                    silent_secs
                );
            }
        }
    }
}
