//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: `/healthz` ahead of routing, everything else to the gateway
//! - Wire up middleware (tracing, request ID)
//! - Serve until shutdown, swapping in reloaded route tables as they arrive

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::admin::handlers::healthz;
use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::Gateway;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::outcome::OutcomeSink;

/// The currently published gateway. Readers load a snapshot per request.
pub type SharedGateway = Arc<ArcSwap<Gateway>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: SharedGateway,
}

/// HTTP server for the gateway listener.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    /// Serve an already published gateway.
    pub fn new(inner: SharedGateway) -> Self {
        let state = AppState { inner };
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the route table from `config` and serve it.
    pub fn from_config(
        config: &GatewayConfig,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, ConfigError> {
        let gateway = Gateway::from_config(config, sink)?;
        Ok(Self::new(Arc::new(ArcSwap::from_pointee(gateway))))
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/healthz", any(healthz))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http()),
            )
    }

    /// Handle shared with the ops router.
    pub fn shared(&self) -> SharedGateway {
        self.state.inner.clone()
    }

    /// The Axum router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the route table
    /// atomically; in-flight requests finish on the table they started with.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let reloader = tokio::spawn(apply_updates(self.state.inner.clone(), config_updates));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Gateway draining connections");
            })
            .await;

        reloader.abort();
        tracing::info!("Gateway stopped");
        result
    }
}

/// Swap in each received configuration, keeping the current one on error.
async fn apply_updates(
    inner: SharedGateway,
    mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
) {
    while let Some(config) = config_updates.recv().await {
        let sink = inner.load().sink();
        match Gateway::from_config(&config, sink) {
            Ok(gateway) => {
                let routes = gateway.table().len();
                inner.store(Arc::new(gateway));
                tracing::info!(routes, "Route table reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected reloaded configuration, keeping current route table");
            }
        }
    }
}

/// Everything that is not `/healthz` goes through the gateway.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let gateway = state.inner.load_full();
    gateway.handle(request).await
}
