//! Ops endpoints: health, metrics and a read-only view of the route table.

pub mod handlers;

use axum::{
    routing::{any, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::http::server::SharedGateway;
use self::handlers::*;

/// State for the ops router.
#[derive(Clone)]
pub struct AdminState {
    pub gateway: SharedGateway,
    pub metrics: Option<PrometheusHandle>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/healthz", any(healthz))
        .route("/metrics", get(get_metrics))
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .with_state(state)
}
