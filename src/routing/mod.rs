//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, method)
//!     → router.rs (ordered scan of the table)
//!     → matcher.rs (prefix match at a segment boundary)
//!     → Return: Matched / MethodNotAllowed / NotFound
//!     → rewrite.rs (strip the matched prefix for the backend)
//!
//! Route Compilation (at startup or reload):
//!     RouteConfig[]
//!     → table.rs (validate, keep configuration order)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (configuration order)

pub mod matcher;
pub mod rewrite;
pub mod router;
pub mod table;

pub use rewrite::rewrite_path;
pub use router::{RouteMatch, Router};
pub use table::{BackendTimeouts, Route, RouteSummary, RouteTable};
