//! Error types for the agent client

use thiserror::Error;

/// Result type alias for agent client operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur when talking to a worker-node agent
#[derive(Debug, Error)]
pub enum AgentError {
    /// HTTP request failed (connection refused, timeout, DNS failure)
    #[error("request to agent failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Agent answered with something other than 202 Accepted
    #[error("agent {node_id} returned status {status} for provision command: {message}")]
    UnexpectedStatus {
        /// Node whose agent answered
        node_id: String,
        /// HTTP status code the agent returned
        status: u16,
        /// Response body, for diagnostics
        message: String,
    },
}

impl AgentError {
    /// Whether the failure was a timeout on the agent call
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(err) if err.is_timeout())
    }
}
