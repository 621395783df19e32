//! Heartbeat API Handler
//!
//! HTTP endpoint agents push their node snapshots to.

use axum::{extract::State, Json};
use macvmorx_core::dto::heartbeat::HeartbeatPayload;

use crate::api::AppState;
use crate::service::heartbeat;

/// POST /api/heartbeat
/// Receive and process a heartbeat from a worker node agent
///
/// Malformed JSON is rejected with 400 by the extractor before this body
/// runs; anything that decodes is accepted.
pub async fn handle_heartbeat(
    State(state): State<AppState>,
    Json(payload): Json<HeartbeatPayload>,
) -> Json<serde_json::Value> {
    heartbeat::apply_heartbeat(&state.nodes, &state.jobs, payload);

    Json(serde_json::json!({ "message": "Heartbeat received" }))
}
