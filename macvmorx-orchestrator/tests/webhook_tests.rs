//! Webhook ingestion behavior tests
//!
//! Drives the full router with signed and unsigned deliveries and checks the
//! resulting job records.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use macvmorx_core::domain::job::{JobState, JobStatus};
use macvmorx_orchestrator::api::{create_router, AppState};
use macvmorx_orchestrator::config::Config;
use sha2::Sha256;
use tower::ServiceExt;

const SECRET: &str = "s3cret";
const TOKEN: &str = "reg-token";

fn test_state(token: &str) -> AppState {
    AppState::new(Config {
        github_webhook_secret: SECRET.to_string(),
        github_runner_registration_token: token.to_string(),
        ..Default::default()
    })
}

fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).expect("hmac key");
    mac.update(body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

fn webhook_request(event: &str, body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook/github")
        .header("Content-Type", "application/json")
        .header("X-GitHub-Event", event);
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature-256", signature);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn queued_body(job_id: i64, labels: &[&str]) -> String {
    serde_json::json!({
        "action": "queued",
        "workflow_job": { "id": job_id, "name": "build", "labels": labels }
    })
    .to_string()
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let state = test_state(TOKEN);
    let body = queued_body(42, &["self-hosted"]);

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let state = test_state(TOKEN);
    let body = queued_body(42, &["self-hosted"]);
    let forged = sign("a different body");

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(forged)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_other_event_types_are_acknowledged_and_ignored() {
    let state = test_state(TOKEN);
    let body = r#"{"zen": "Design for failure."}"#;

    let response = create_router(state.clone())
        .oneshot(webhook_request("ping", body, Some(sign(body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_a_bad_request() {
    let state = test_state(TOKEN);
    let body = "not json at all";

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", body, Some(sign(body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_queued_without_self_hosted_label_is_ignored() {
    let state = test_state(TOKEN);
    let body = queued_body(42, &["ubuntu-latest"]);

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_queued_without_registration_token_is_rejected() {
    let state = test_state("");
    let body = queued_body(42, &["self-hosted", "macos-image-runner-v1"]);

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.jobs.list().is_empty());
}

#[tokio::test]
async fn test_queued_event_creates_tracked_job() {
    let state = test_state(TOKEN);
    let body = queued_body(42, &["self-hosted", "macos-image-runner-v1"]);

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let job = state.jobs.get(42).expect("job tracked");
    assert_eq!(job.image_name, "runner-v1");
    assert_eq!(
        job.labels,
        vec!["self-hosted".to_string(), "macos-image-runner-v1".to_string()]
    );
}

#[tokio::test]
async fn test_first_image_label_wins() {
    let state = test_state(TOKEN);
    let body = queued_body(43, &["self-hosted", "macos-image-foo", "macos-image-bar"]);

    create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(state.jobs.get(43).expect("job tracked").image_name, "foo");
}

#[tokio::test]
async fn test_queued_without_image_label_uses_default() {
    let state = test_state(TOKEN);
    let body = queued_body(44, &["self-hosted"]);

    create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(
        state.jobs.get(44).expect("job tracked").image_name,
        "default-macos-image"
    );
}

#[tokio::test]
async fn test_queued_with_empty_fleet_eventually_fails() {
    let state = test_state(TOKEN);
    let body = queued_body(45, &["self-hosted", "macos-image-runner-v1"]);

    create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    // Placement runs in a spawned task; with no nodes it must mark the job
    // failed without any outbound RPC.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let job = state.jobs.get(45).expect("job tracked");
        if job.status == JobState::Failed {
            assert!(job.end_time.is_some());
            assert!(job.node_id.is_none());
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job 45 never reached failed, stuck at {}",
            job.status
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_completed_event_finishes_job() {
    let state = test_state(TOKEN);
    let mut job = JobStatus::queued(42, "runner-v1".to_string(), vec!["self-hosted".to_string()]);
    job.status = JobState::Running;
    state.jobs.add(job);

    let body = serde_json::json!({
        "action": "completed",
        "workflow_job": { "id": 42, "runner_id": 7, "runner_name": "macvmorx-runner-a-42" }
    })
    .to_string();

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let job = state.jobs.get(42).expect("job tracked");
    assert_eq!(job.status, JobState::Completed);
    assert!(job.end_time.is_some());
}

#[tokio::test]
async fn test_terminal_event_overwrites_placer_failure() {
    let state = test_state(TOKEN);
    let mut job = JobStatus::queued(42, "runner-v1".to_string(), vec![]);
    job.status = JobState::Failed;
    state.jobs.add(job);

    let body = serde_json::json!({
        "action": "cancelled",
        "workflow_job": { "id": 42 }
    })
    .to_string();

    create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(state.jobs.get(42).expect("job tracked").status, JobState::Cancelled);
}

#[tokio::test]
async fn test_unsupported_action_is_ignored() {
    let state = test_state(TOKEN);
    state
        .jobs
        .add(JobStatus::queued(42, "runner-v1".to_string(), vec![]));

    let body = serde_json::json!({
        "action": "in_progress",
        "workflow_job": { "id": 42 }
    })
    .to_string();

    let response = create_router(state.clone())
        .oneshot(webhook_request("workflow_job", &body, Some(sign(&body))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.jobs.get(42).expect("job tracked").status, JobState::Queued);
}
