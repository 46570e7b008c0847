//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, /healthz, middleware)
//!     → request.rs (request ID)
//!     → Gateway::handle (routing, forwarding)
//!     → response.rs (404 / 405 / 502 authored by the gateway)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, SharedGateway};
