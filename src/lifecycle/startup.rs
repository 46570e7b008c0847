//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table from the loaded configuration
//! - Install the metrics recorder and start the config watcher
//! - Bind the ops and gateway listeners and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before traffic is accepted
//! - Listeners start last (traffic only when ready)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{metrics, TelemetrySink};
use crate::outcome::OutcomeSink;

/// Why the gateway could not start or stopped abnormally.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Run the gateway with an already loaded configuration until shutdown.
pub async fn run(config: GatewayConfig, config_path: PathBuf) -> Result<(), StartupError> {
    let sink: Arc<dyn OutcomeSink> = Arc::new(TelemetrySink);
    let server = GatewayServer::from_config(&config, sink)?;

    for route in server.shared().load().table().iter() {
        tracing::info!(
            pattern = %route.pattern(),
            methods = ?route.allowed_methods(),
            backend = %route.backend(),
            "Registered route"
        );
    }

    let metrics_handle = if config.observability.metrics_enabled {
        let handle = metrics::init_metrics()?;
        let upkeep = handle.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
            loop {
                ticker.tick().await;
                upkeep.run_upkeep();
            }
        });
        Some(handle)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let signals = spawn_signal_listener(shutdown.clone());

    let (watcher, config_updates) = if config.reload.watch {
        let (watcher, updates) = ConfigWatcher::new(&config_path);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let admin_listener = bind(&config.admin.bind_address).await?;
    let gateway_listener = bind(&config.listener.bind_address).await?;

    let admin_app = setup_admin_router(AdminState {
        gateway: server.shared(),
        metrics: metrics_handle,
    });
    let admin_shutdown = shutdown.signalled();
    tracing::info!(address = %config.admin.bind_address, "Ops endpoints listening");
    let admin = tokio::spawn(async move {
        axum::serve(admin_listener, admin_app)
            .with_graceful_shutdown(admin_shutdown)
            .await
    });

    let result = server
        .run(gateway_listener, config_updates, shutdown.signalled())
        .await;

    if !shutdown.is_triggered() {
        tracing::warn!("Gateway stopped without a shutdown signal, stopping ops listener");
        shutdown.trigger();
    }
    match admin.await {
        Ok(Err(e)) => tracing::error!(error = %e, "Ops server failed"),
        Err(e) => tracing::error!(error = %e, "Ops server task panicked"),
        Ok(Ok(())) => {}
    }
    signals.abort();
    drop(watcher);

    result?;
    Ok(())
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}
