//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::config::{RouteConfig, TimeoutConfig};
use api_gateway::routing::RouteTable;
use api_gateway::{Gateway, OutcomeEvent, OutcomeKind, OutcomeSink};
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Outcome sink that keeps every event for inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OutcomeEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<OutcomeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<OutcomeKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

impl OutcomeSink for RecordingSink {
    fn record(&self, event: OutcomeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Gateway over `routes` with a recording sink.
pub fn gateway(routes: Vec<RouteConfig>) -> (Arc<Gateway>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let table = RouteTable::from_config(&routes, &TimeoutConfig::default()).unwrap();
    let gateway = Gateway::new(table, sink.clone());
    (Arc::new(gateway), sink)
}

/// Serve `app` on an ephemeral local port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Backend that echoes what it received as JSON and counts requests.
pub async fn start_echo_backend(name: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let (parts, body) = request.into_parts();
            let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            let header = |key: &str| {
                parts
                    .headers
                    .get(key)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let header_names: Vec<&str> = parts.headers.keys().map(|k| k.as_str()).collect();
            let echoed: Value = json!({
                "backend": name,
                "method": parts.method.as_str(),
                "path": parts.uri.path(),
                "query": parts.uri.query(),
                "host": header("host"),
                "request_id": header("x-request-id"),
                "custom": header("x-custom"),
                "body": String::from_utf8_lossy(&bytes),
                "header_names": header_names,
            });
            ([("x-backend", name)], Json(echoed))
        }
    });

    (spawn_app(app).await, hits)
}

/// Backend answering every request with `status` and `body`.
pub async fn start_status_backend(status: u16, body: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        (StatusCode::from_u16(status).unwrap(), body).into_response()
    });
    spawn_app(app).await
}

/// Backend that waits `delay` before answering.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "finally"
    });
    spawn_app(app).await
}

/// Backend answering 200 with the given extra response headers.
pub async fn start_header_backend(headers: &'static [(&'static str, &'static str)]) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        let mut response = "headers".into_response();
        for &(name, value) in headers {
            response.headers_mut().insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        response
    });
    spawn_app(app).await
}

/// Counts handlers dropped before they finished.
struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend whose handler never answers; reports how many handlers were dropped.
pub async fn start_stalled_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let dropped = Arc::new(AtomicUsize::new(0));
    let counter = dropped.clone();

    let app = Router::new().fallback(move || {
        let guard = DropCounter(counter.clone());
        async move {
            let _guard = guard;
            std::future::pending::<&'static str>().await
        }
    });

    (spawn_app(app).await, dropped)
}

/// Backend that accepts TCP connections and closes them without a response.
pub async fn start_hangup_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    (addr, accepted)
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn http(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// Read a response body as JSON.
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
