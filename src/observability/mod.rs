//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway::handle
//!     → OutcomeEvent (exactly one per request)
//!     → TelemetrySink
//!         → logging.rs (structured log line)
//!         → metrics.rs (counters, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape on the ops listener)
//! ```

pub mod logging;
pub mod metrics;

use crate::outcome::{OutcomeEvent, OutcomeSink};

/// Sink that logs and counts every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetrySink;

impl OutcomeSink for TelemetrySink {
    fn record(&self, event: OutcomeEvent) {
        self::logging::log_outcome(&event);
        self::metrics::record_outcome(&event);
    }
}
