//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (connect deadline in the connector, response-header deadline around the call)
//!     → on expiry the call is dropped and reported as a backend error
//! ```
//!
//! # Design Decisions
//! - Every backend call has a deadline
//! - No retries and no circuit breaking: one attempt per request

pub mod timeouts;
