//! macvmorx
//!
//! A control-plane orchestrator for Mac virtual machines on Mac Mini labs.
//! It ingests agent heartbeats, monitors node health, reacts to GitHub
//! workflow job webhooks by provisioning runner VMs, and serves a small web
//! dashboard.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use macvmorx_orchestrator::api::{self, AppState};
use macvmorx_orchestrator::config::Config;
use macvmorx_orchestrator::service::monitor;

#[derive(Parser)]
#[command(name = "macvmorx")]
#[command(about = "macvmorx is a Kubernetes-like orchestrator for Mac virtual machines")]
#[command(
    long_about = "A comprehensive orchestrator for managing Mac virtual machines on Mac Mini \
                  labs. It handles heartbeats, monitors node health, and provides a web \
                  interface for easy access. Integrates with GitHub webhooks for reactive VM \
                  provisioning."
)]
struct Cli {
    /// Port for the web server
    #[arg(short = 'p', long, env = "MACVMORX_WEB_PORT", default_value = "8080")]
    port: String,

    /// Seconds without a heartbeat after which a node is considered offline
    #[arg(
        long,
        env = "MACVMORX_OFFLINE_TIMEOUT",
        default_value_t = 45,
        value_name = "SECONDS"
    )]
    offline_timeout: u64,

    /// Interval for checking offline nodes, in seconds
    #[arg(
        long,
        env = "MACVMORX_MONITOR_INTERVAL",
        default_value_t = 5,
        value_name = "SECONDS"
    )]
    monitor_interval: u64,

    /// GitHub webhook secret for signature validation
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", default_value = "", hide_env_values = true)]
    github_webhook_secret: String,

    /// Static GitHub Actions runner registration token
    #[arg(
        long,
        env = "GITHUB_RUNNER_REGISTRATION_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    github_runner_registration_token: String,

    /// Path to a file to additionally write logs to
    #[arg(long, env = "MACVMORX_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the macvmorx web server
    Server,
    /// Get the current status of all nodes
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        web_port: cli.port,
        offline_timeout: Duration::from_secs(cli.offline_timeout),
        monitor_interval: Duration::from_secs(cli.monitor_interval),
        github_webhook_secret: cli.github_webhook_secret,
        github_runner_registration_token: cli.github_runner_registration_token,
        log_file: cli.log_file,
    };

    init_tracing(config.log_file.as_deref())?;

    match cli.command.unwrap_or(Commands::Server) {
        Commands::Server => run_server(config).await,
        Commands::Status => {
            tracing::info!("To get node status, please access the web interface.");
            tracing::info!(
                "Web server will be available at http://localhost:{}",
                config.web_port
            );
            Ok(())
        }
    }
}

/// Initialize tracing, optionally duplicating output into a log file
fn init_tracing(log_file: Option<&std::path::Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "macvmorx_orchestrator=debug,tower_http=debug".into());

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();

            tracing::info!("Logging to file: {}", path.display());
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

/// Start the listener, the offline sweeper, and serve until shutdown
async fn run_server(config: Config) -> Result<()> {
    config.validate()?;

    tracing::info!("Starting macvmorx orchestrator...");

    let monitor_interval = config.monitor_interval;
    let state = AppState::new(config);

    tokio::spawn(monitor::run_offline_monitor(
        state.nodes.clone(),
        monitor_interval,
    ));

    let addr = format!("0.0.0.0:{}", state.config.web_port);
    let app = api::create_router(state);

    tracing::info!("Web server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .await
        .context("web server failed")?;

    Ok(())
}
