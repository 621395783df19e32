//! macvmorx Agent Client
//!
//! A small, type-safe HTTP client for the worker-side agent that provisions
//! VMs on a Mac Mini node.
//!
//! The protocol is deliberately asymmetric: the orchestrator fires a single
//! provision command at the agent and never polls it again. The only
//! confirmation that a VM came up is the node's next heartbeat listing it.
//!
//! # Example
//!
//! ```no_run
//! use macvmorx_agent_client::AgentClient;
//! use macvmorx_core::dto::provision::VmProvisionCommand;
//!
//! # async fn example() -> macvmorx_agent_client::Result<()> {
//! let client = AgentClient::new();
//! client
//!     .provision_vm(
//!         "mini-01",
//!         &VmProvisionCommand {
//!             vm_id: "vm-42".to_string(),
//!             image_name: "runner-v1".to_string(),
//!             runner_registration_token: "token".to_string(),
//!             runner_name: "macvmorx-runner-mini-01-42-250802120000".to_string(),
//!             runner_labels: vec!["self-hosted".to_string()],
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::{AgentError, Result};

use std::time::Duration;

use macvmorx_core::dto::provision::VmProvisionCommand;
use reqwest::{Client, StatusCode};

/// Port every agent listens on
pub const DEFAULT_AGENT_PORT: u16 = 8081;

/// Timeout for a single agent call
const AGENT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for worker-node agents
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct AgentClient {
    /// HTTP client instance
    client: Client,
    /// Port agents listen on, normally [`DEFAULT_AGENT_PORT`]
    port: u16,
}

impl AgentClient {
    /// Create a client targeting agents on the default port
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            port: DEFAULT_AGENT_PORT,
        }
    }

    /// Create a client targeting agents on a non-standard port
    ///
    /// Useful for tests that stand in a stub agent on an ephemeral port.
    pub fn with_port(port: u16) -> Self {
        Self {
            client: Client::new(),
            port,
        }
    }

    /// The port this client dials agents on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Instruct the agent on `node_id` to provision a VM
    ///
    /// Success is exactly HTTP 202 Accepted. Any other status, a connection
    /// error, or the 10-second timeout is an error; the command is not
    /// retried here.
    pub async fn provision_vm(&self, node_id: &str, cmd: &VmProvisionCommand) -> Result<()> {
        let url = format!("http://{}:{}/provision-vm", node_id, self.port);

        let response = self
            .client
            .post(&url)
            .timeout(AGENT_TIMEOUT)
            .json(cmd)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AgentError::UnexpectedStatus {
                node_id: node_id.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Provision command for {} accepted by agent {}", cmd.vm_id, node_id);
        Ok(())
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_default_port() {
        let client = AgentClient::new();
        assert_eq!(client.port(), DEFAULT_AGENT_PORT);
    }

    #[test]
    fn test_client_with_custom_port() {
        let client = AgentClient::with_port(9999);
        assert_eq!(client.port(), 9999);
    }
}
