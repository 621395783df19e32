//! Orchestrator configuration
//!
//! All settings come from environment variables with CLI flag overrides;
//! defaults suit a single-orchestrator lab deployment.

use std::path::PathBuf;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP listener binds
    pub web_port: String,

    /// How long a node may stay silent before it is considered offline
    pub offline_timeout: Duration,

    /// How often the offline sweeper scans the node registry
    pub monitor_interval: Duration,

    /// Shared secret for GitHub webhook signature verification
    pub github_webhook_secret: String,

    /// Static token VMs use to register as self-hosted runners
    ///
    /// If empty when a queued event arrives, the event is rejected with 500.
    pub github_runner_registration_token: String,

    /// Optional file to duplicate log output into
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Validates the configuration before the server starts
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.web_port.parse::<u16>().is_err() {
            anyhow::bail!("web port '{}' is not a valid port number", self.web_port);
        }

        if self.offline_timeout.is_zero() {
            anyhow::bail!("offline timeout must be greater than 0");
        }

        if self.monitor_interval.is_zero() {
            anyhow::bail!("monitor interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_port: "8080".to_string(),
            offline_timeout: Duration::from_secs(45),
            monitor_interval: Duration::from_secs(5),
            github_webhook_secret: String::new(),
            github_runner_registration_token: String::new(),
            log_file: None,
        }
    }
}
