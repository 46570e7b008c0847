//! Path-prefix HTTP API gateway library.

pub mod admin;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod outcome;
pub mod proxy;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use gateway::Gateway;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use outcome::{OutcomeEvent, OutcomeKind, OutcomeSink};
