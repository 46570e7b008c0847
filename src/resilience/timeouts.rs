//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound connection establishment per backend
//! - Bound the wait for backend response headers
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out backend calls are answered with 502 like any transport failure

use std::future::Future;
use std::time::Duration;

use hyper_util::client::legacy::connect::HttpConnector;

use crate::routing::BackendTimeouts;

/// HTTP connector that gives up connecting after `timeouts.connect`.
pub fn connector(timeouts: BackendTimeouts) -> HttpConnector {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(timeouts.connect));
    connector.set_nodelay(true);
    connector
}

/// Run `fut` with a deadline. `None` means the deadline passed first and
/// `fut` was dropped.
pub async fn within<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}
