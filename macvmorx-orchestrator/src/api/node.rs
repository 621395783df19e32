//! Node API Handlers

use axum::{extract::State, Json};
use macvmorx_core::domain::node::NodeStatus;

use crate::api::AppState;

/// GET /api/nodes
/// List all known nodes with their online flag recomputed
pub async fn list_nodes(State(state): State<AppState>) -> Json<Vec<NodeStatus>> {
    tracing::debug!("Listing all nodes");
    Json(state.nodes.list())
}
