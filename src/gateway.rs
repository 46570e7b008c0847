//! Per-request gateway logic.
//!
//! A [`Gateway`] bundles the router and dispatcher built from one route table
//! with the outcome sink. [`Gateway::handle`] is the only place a request's
//! outcome is decided and recorded.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, Response, StatusCode};

use crate::config::{ConfigError, GatewayConfig};
use crate::http::request::request_id_of;
use crate::http::response;
use crate::outcome::{OutcomeEvent, OutcomeKind, OutcomeSink};
use crate::proxy::ProxyDispatcher;
use crate::routing::{rewrite_path, RouteMatch, RouteTable, Router};

/// Router + dispatcher + sink for one published route table.
pub struct Gateway {
    router: Router,
    dispatcher: ProxyDispatcher,
    sink: Arc<dyn OutcomeSink>,
}

impl Gateway {
    pub fn new(table: RouteTable, sink: Arc<dyn OutcomeSink>) -> Self {
        let dispatcher = ProxyDispatcher::new(&table);
        Self {
            router: Router::new(Arc::new(table)),
            dispatcher,
            sink,
        }
    }

    /// Build the route table from `config` and wrap it.
    pub fn from_config(
        config: &GatewayConfig,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, ConfigError> {
        let table = RouteTable::from_config(&config.routes, &config.timeouts)?;
        Ok(Self::new(table, sink))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn table(&self) -> &RouteTable {
        self.router.table()
    }

    pub fn sink(&self) -> Arc<dyn OutcomeSink> {
        self.sink.clone()
    }

    /// Route, forward and classify one request.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        tracing::debug!(
            request_id = %request_id_of(&request),
            client = ?client,
            method = %method,
            uri = %request.uri(),
            "Incoming request"
        );

        let mut outcome = PendingOutcome::new(self.sink.as_ref(), method.clone(), path.clone());

        match self.router.resolve(&path, &method) {
            RouteMatch::NotFound => {
                outcome.finish(OutcomeKind::NotFound, StatusCode::NOT_FOUND);
                response::not_found()
            }
            RouteMatch::MethodNotAllowed { route, .. } => {
                outcome.pattern = Some(route.pattern().to_string());
                outcome.finish(OutcomeKind::MethodRejected, StatusCode::METHOD_NOT_ALLOWED);
                response::method_not_allowed(route.allowed_methods())
            }
            RouteMatch::Matched { route, index } => {
                outcome.pattern = Some(route.pattern().to_string());

                let outbound_path = rewrite_path(route.pattern(), &path);
                tracing::debug!(
                    path = %path,
                    outbound_path = %outbound_path,
                    backend = %route.authority(),
                    "Request path rewritten"
                );

                match self
                    .dispatcher
                    .forward(index, route, &outbound_path, request)
                    .await
                {
                    Ok(response) => {
                        outcome.finish(OutcomeKind::Forwarded, response.status());
                        response
                    }
                    Err(e) => {
                        tracing::debug!(
                            backend = %route.authority(),
                            unreachable = e.is_connect(),
                            "Backend call failed"
                        );
                        outcome.error = Some(e.describe());
                        outcome.finish(OutcomeKind::BackendError, StatusCode::BAD_GATEWAY);
                        response::bad_gateway()
                    }
                }
            }
        }
    }
}

/// Records the request's outcome exactly once.
///
/// Dropped unfinished (the client went away while the backend call was in
/// flight), it records a `BackendError`.
struct PendingOutcome<'a> {
    sink: &'a dyn OutcomeSink,
    method: Method,
    path: String,
    pattern: Option<String>,
    error: Option<String>,
    started: Instant,
    done: bool,
}

impl<'a> PendingOutcome<'a> {
    fn new(sink: &'a dyn OutcomeSink, method: Method, path: String) -> Self {
        Self {
            sink,
            method,
            path,
            pattern: None,
            error: None,
            started: Instant::now(),
            done: false,
        }
    }

    fn finish(&mut self, kind: OutcomeKind, status: StatusCode) {
        if self.done {
            return;
        }
        self.done = true;
        self.sink.record(OutcomeEvent {
            kind,
            pattern: self.pattern.take(),
            status,
            method: self.method.clone(),
            path: std::mem::take(&mut self.path),
            elapsed: self.started.elapsed(),
            error: self.error.take(),
        });
    }
}

impl Drop for PendingOutcome<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.error = Some("request cancelled before the backend responded".to_string());
            self.finish(OutcomeKind::BackendError, StatusCode::BAD_GATEWAY);
        }
    }
}
