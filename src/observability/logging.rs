//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Render outcome events as log lines
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level from config, `RUST_LOG` takes precedence

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::outcome::{OutcomeEvent, OutcomeKind};

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Emit one log line for a request outcome.
pub fn log_outcome(event: &OutcomeEvent) {
    let route = event.pattern.as_deref().unwrap_or("none");
    let status = event.status.as_u16();
    let elapsed_ms = event.elapsed.as_secs_f64() * 1000.0;

    match event.kind {
        OutcomeKind::Forwarded => tracing::info!(
            outcome = %event.kind,
            method = %event.method,
            path = %event.path,
            route,
            status,
            elapsed_ms,
            "Request forwarded"
        ),
        OutcomeKind::NotFound => tracing::info!(
            outcome = %event.kind,
            method = %event.method,
            path = %event.path,
            status,
            "No route matched"
        ),
        OutcomeKind::MethodRejected => tracing::warn!(
            outcome = %event.kind,
            method = %event.method,
            path = %event.path,
            route,
            status,
            "Method not allowed for route"
        ),
        OutcomeKind::BackendError => tracing::error!(
            outcome = %event.kind,
            method = %event.method,
            path = %event.path,
            route,
            status,
            elapsed_ms,
            error = event.error.as_deref().unwrap_or("unknown"),
            "Backend request failed"
        ),
    }
}
