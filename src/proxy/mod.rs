//! Proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route + rewritten path + inbound request
//!     → dispatcher.rs (build outbound request, call backend)
//!     → backend response streamed back as-is
//!     → or error.rs (DispatchError, answered with 502 by the gateway)
//! ```

pub mod dispatcher;
pub mod error;

pub use dispatcher::ProxyDispatcher;
pub use error::DispatchError;
