//! API Gateway
//!
//! Forwards HTTP requests to backend services by path prefix.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────┐
//!                       │                    API GATEWAY                     │
//!   Client Request      │  ┌────────┐    ┌─────────┐    ┌──────────────┐     │
//!   ────────────────────┼─▶│  http  │───▶│ routing │───▶│    proxy     │─────┼──▶ Backend
//!                       │  │ server │    │ router  │    │  dispatcher  │     │
//!                       │  └────────┘    └─────────┘    └──────┬───────┘     │
//!   Client Response     │                                      │             │
//!   ◀───────────────────┼──────────────────────────────────────┘             │
//!                       │                                                    │
//!                       │  ┌──────────────────────────────────────────────┐  │
//!                       │  │ config · outcome sink · observability · admin │  │
//!                       │  └──────────────────────────────────────────────┘  │
//!                       └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api_gateway::config::{self, ObservabilityConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use api_gateway::lifecycle;
use api_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "api-gateway", version)]
#[command(about = "Path-prefix HTTP API gateway", long_about = None)]
struct Cli {
    /// Route configuration file (TOML).
    #[arg(short, long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(path = %cli.config.display(), error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        admin_address = %config.admin.bind_address,
        routes = config.routes.len(),
        hot_reload = config.reload.watch,
        "api-gateway starting"
    );

    match lifecycle::run(config, cli.config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
