//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, same rules as route table construction)
//!     → GatewayConfig (validated, immutable)
//!     → RouteTable built once and shared via Arc
//!
//! On file change (reload.watch = true):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server builds a new Gateway and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, ReloadConfig,
    RouteConfig, TimeoutConfig,
};
pub use validation::ValidationError;
