//! Per-request outcome events.
//!
//! The gateway classifies every request it handles into exactly one
//! [`OutcomeKind`] and hands the event to an injected [`OutcomeSink`].
//! Counting and log rendering live behind the sink.

use std::fmt;
use std::time::Duration;

use axum::http::{Method, StatusCode};

/// Terminal classification of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Forwarded to a backend and a response came back (any status).
    Forwarded,
    /// A route path-matched but its allow-list rejected the method.
    MethodRejected,
    /// No route path-matched.
    NotFound,
    /// The backend call failed at the transport level.
    BackendError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Forwarded => "forwarded",
            OutcomeKind::MethodRejected => "method_rejected",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::BackendError => "backend_error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request's outcome. Created once, consumed immediately by the sink.
#[derive(Debug, Clone)]
pub struct OutcomeEvent {
    pub kind: OutcomeKind,
    /// Pattern of the selected route; `None` for `NotFound`.
    pub pattern: Option<String>,
    /// Status sent to the client.
    pub status: StatusCode,
    pub method: Method,
    /// Original request path.
    pub path: String,
    /// Time spent handling the request up to the terminal decision.
    pub elapsed: Duration,
    /// Transport error text for `BackendError`.
    pub error: Option<String>,
}

/// Receives outcome events. Called exactly once per handled request.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, event: OutcomeEvent);
}
