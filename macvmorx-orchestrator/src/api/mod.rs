//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod heartbeat;
pub mod job;
pub mod node;
pub mod webhook;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use macvmorx_agent_client::AgentClient;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::registry::{JobRegistry, NodeRegistry};
use crate::service::placement::Placer;

/// Directory the dashboard is served from
const STATIC_DIR: &str = "./internal/web/static";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub nodes: Arc<NodeRegistry>,
    pub jobs: Arc<JobRegistry>,
    pub placer: Arc<Placer>,
}

impl AppState {
    /// Wires up registries and the placer from a configuration
    pub fn new(config: Config) -> Self {
        Self::with_agent_client(config, AgentClient::new())
    }

    /// Same as [`AppState::new`] but with a custom agent client
    ///
    /// Tests use this to point dispatch at a stub agent.
    pub fn with_agent_client(config: Config, agent: AgentClient) -> Self {
        let nodes = Arc::new(NodeRegistry::new(config.offline_timeout));
        let jobs = Arc::new(JobRegistry::new());
        let placer = Arc::new(Placer::new(nodes.clone(), jobs.clone(), agent));
        Self {
            config: Arc::new(config),
            nodes,
            jobs,
            placer,
        }
    }
}

/// Create the main router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // CORS applies to /api/* only; the webhook endpoint is server-to-server.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
            header::AUTHORIZATION,
        ]);

    let api = Router::new()
        .route("/heartbeat", post(heartbeat::handle_heartbeat))
        .route("/nodes", get(node::list_nodes))
        .route("/jobs", get(job::list_jobs))
        .layer(cors);

    Router::new()
        .nest("/api", api)
        .route("/webhook/github", post(webhook::handle_github_webhook))
        .fallback_service(ServeDir::new(STATIC_DIR))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
