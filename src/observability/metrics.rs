//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): every handled request, by route
//! - `http_requests_success_total` (counter): forwarded requests
//! - `http_requests_method_not_allowed_total` (counter): 405s
//! - `http_requests_not_found_total` (counter): 404s
//! - `http_requests_backend_error_total` (counter): 502s
//! - `http_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recorder installed once at startup; without it updates are no-ops

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::outcome::{OutcomeEvent, OutcomeKind};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const SUCCESS_TOTAL: &str = "http_requests_success_total";
pub const METHOD_NOT_ALLOWED_TOTAL: &str = "http_requests_method_not_allowed_total";
pub const NOT_FOUND_TOTAL: &str = "http_requests_not_found_total";
pub const BACKEND_ERROR_TOTAL: &str = "http_requests_backend_error_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Install the Prometheus recorder and describe the gateway metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(REQUESTS_TOTAL, "Total requests received");
    describe_counter!(SUCCESS_TOTAL, "Requests forwarded to a backend");
    describe_counter!(METHOD_NOT_ALLOWED_TOTAL, "Method not allowed requests");
    describe_counter!(NOT_FOUND_TOTAL, "Requests not found");
    describe_counter!(BACKEND_ERROR_TOTAL, "Requests whose backend call failed");
    describe_histogram!(REQUEST_DURATION, "Request handling latency in seconds");

    Ok(handle)
}

/// Counter incremented for `kind`, besides the total.
pub fn counter_for(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::Forwarded => SUCCESS_TOTAL,
        OutcomeKind::MethodRejected => METHOD_NOT_ALLOWED_TOTAL,
        OutcomeKind::NotFound => NOT_FOUND_TOTAL,
        OutcomeKind::BackendError => BACKEND_ERROR_TOTAL,
    }
}

/// Count one request outcome.
pub fn record_outcome(event: &OutcomeEvent) {
    let route = event.pattern.clone().unwrap_or_else(|| "none".to_string());

    counter!(REQUESTS_TOTAL, "route" => route.clone()).increment(1);
    counter!(counter_for(event.kind), "route" => route).increment(1);
    histogram!(REQUEST_DURATION, "outcome" => event.kind.as_str())
        .record(event.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::{Method, StatusCode};

    fn event(kind: OutcomeKind, pattern: Option<&str>, status: StatusCode) -> OutcomeEvent {
        OutcomeEvent {
            kind,
            pattern: pattern.map(str::to_string),
            status,
            method: Method::GET,
            path: "/x".to_string(),
            elapsed: Duration::from_millis(3),
            error: None,
        }
    }

    #[test]
    fn test_outcomes_render_as_prometheus_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_outcome(&event(OutcomeKind::NotFound, None, StatusCode::NOT_FOUND));
            record_outcome(&event(OutcomeKind::Forwarded, Some("/users"), StatusCode::OK));
            record_outcome(&event(OutcomeKind::Forwarded, Some("/users"), StatusCode::OK));
        });

        let text = handle.render();
        assert!(text.contains("http_requests_not_found_total{route=\"none\"} 1"), "{text}");
        assert!(text.contains("http_requests_success_total{route=\"/users\"} 2"), "{text}");
        assert!(text.contains("http_requests_total{route=\"/users\"} 2"), "{text}");
        assert!(!text.contains("http_requests_backend_error_total{"), "{text}");
        assert!(text.contains(REQUEST_DURATION), "{text}");
    }

    #[test]
    fn test_each_outcome_has_its_own_counter() {
        let names = [
            counter_for(OutcomeKind::Forwarded),
            counter_for(OutcomeKind::MethodRejected),
            counter_for(OutcomeKind::NotFound),
            counter_for(OutcomeKind::BackendError),
        ];
        for (i, a) in names.iter().enumerate() {
            assert_ne!(*a, REQUESTS_TOTAL);
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
