//! Issue Tracker
//!
//! ```text
//!     Client ──▶ axum router ──▶ handlers ──▶ IssueStore ──▶ DocumentStore ──▶ issues.json
//!                  │
//!                  ├─ request id / trace / timeout / body limit
//!                  └─ metrics (optional Prometheus endpoint)
//! ```

use std::path::PathBuf;

use clap::Parser;

use issue_tracker::config::resolve_config;
use issue_tracker::lifecycle::startup;
use issue_tracker::observability::logging;

#[derive(Parser)]
#[command(name = "issue-tracker")]
#[command(about = "Project-scoped issue tracking API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "issue-tracker starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
