//! Job API Handlers

use axum::{extract::State, Json};
use macvmorx_core::domain::job::JobStatus;

use crate::api::AppState;

/// GET /api/jobs
/// List all tracked CI jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    tracing::debug!("Listing all jobs");
    Json(state.jobs.list())
}
