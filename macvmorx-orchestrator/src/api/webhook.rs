//! GitHub Webhook Handler
//!
//! Entry point for CI job events. The raw body is buffered once and fed to
//! both signature verification and JSON parsing: the signature covers the
//! exact bytes GitHub sent, so verification must happen before any decoding.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use hmac::{Hmac, Mac};
use macvmorx_core::domain::job::{JobState, JobStatus};
use macvmorx_core::dto::webhook::WorkflowJobEvent;
use sha2::Sha256;

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;

/// Label a job must carry to be considered for this fleet
const SELF_HOSTED_LABEL: &str = "self-hosted";

/// Label prefix that names the VM image a job wants
const IMAGE_LABEL_PREFIX: &str = "macos-image-";

/// Image used when no `macos-image-` label is present
const DEFAULT_IMAGE: &str = "default-macos-image";

/// POST /webhook/github
/// Validate and ingest a GitHub webhook delivery
pub async fn handle_github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-Hub-Signature-256 header".to_string()))?;

    if !verify_signature(&state.config.github_webhook_secret, &body, signature) {
        tracing::warn!("Rejected webhook delivery with invalid signature");
        return Err(ApiError::Unauthorized("invalid webhook signature".to_string()));
    }

    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if event_type != "workflow_job" {
        tracing::debug!("Ignoring event type: {}", event_type);
        return Ok(StatusCode::OK);
    }

    let event: WorkflowJobEvent = serde_json::from_slice(&body)
        .map_err(|err| ApiError::BadRequest(format!("invalid webhook payload: {err}")))?;

    match event.action.as_str() {
        "queued" => handle_queued(&state, event),
        action => {
            if let Some(terminal) = JobState::from_terminal_action(action) {
                handle_terminal(&state, event, terminal);
                Ok(StatusCode::OK)
            } else {
                tracing::debug!("Ignoring workflow_job action: {}", action);
                Ok(StatusCode::OK)
            }
        }
    }
}

/// Handles a queued workflow job: record it and kick off async placement
fn handle_queued(state: &AppState, event: WorkflowJobEvent) -> ApiResult<StatusCode> {
    let job = event.workflow_job;

    if !job.labels.iter().any(|label| label == SELF_HOSTED_LABEL) {
        tracing::info!("Job {} does not request self-hosted runners, ignoring", job.id);
        return Ok(StatusCode::OK);
    }

    let image_name = match job
        .labels
        .iter()
        .find_map(|label| label.strip_prefix(IMAGE_LABEL_PREFIX))
    {
        Some(suffix) => suffix.to_string(),
        None => {
            tracing::warn!(
                "Job {} has no {} label, using image '{}'",
                job.id,
                IMAGE_LABEL_PREFIX,
                DEFAULT_IMAGE
            );
            DEFAULT_IMAGE.to_string()
        }
    };

    let token = state.config.github_runner_registration_token.clone();
    if token.is_empty() {
        tracing::error!(
            "Job {} queued but no runner registration token is configured",
            job.id
        );
        return Err(ApiError::InternalError(
            "runner registration token is not configured".to_string(),
        ));
    }

    tracing::info!(
        "Job {} ({}) queued for image {} with labels {:?}",
        job.id,
        job.name,
        image_name,
        job.labels
    );
    state
        .jobs
        .add(JobStatus::queued(job.id, image_name.clone(), job.labels.clone()));

    // Placement must not hold up the webhook acknowledgement; it runs in its
    // own task under the placer's deadline.
    let placer = state.placer.clone();
    tokio::spawn(async move {
        placer.place_job(job.id, job.labels, image_name, token).await;
    });

    Ok(StatusCode::OK)
}

/// Handles a terminal workflow job action (completed / cancelled / skipped)
fn handle_terminal(state: &AppState, event: WorkflowJobEvent, terminal: JobState) {
    let job = event.workflow_job;
    tracing::info!(
        "Job {} ({}) reported {} (runner id: {:?})",
        job.id,
        job.name,
        terminal,
        job.runner_id
    );

    state.jobs.update(job.id, |record| {
        record.status = terminal;
        record.end_time = Some(chrono::Utc::now());
    });
}

/// Checks `X-Hub-Signature-256` against HMAC-SHA256(secret, body)
///
/// The header carries `sha256=<hex>`; comparison happens in constant time
/// inside the MAC verification.
fn verify_signature(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(hex_digest) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
