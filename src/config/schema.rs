//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway listener configuration.
    pub listener: ListenerConfig,

    /// Ops listener serving `/healthz`, `/metrics` and `/admin/routes`.
    pub admin: AdminConfig,

    /// Route definitions, in match order.
    pub routes: Vec<RouteConfig>,

    /// Default backend timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Hot reload settings.
    pub reload: ReloadConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Ops listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bind address for the health/metrics/admin endpoints.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// A single route: path prefix, allowed methods and backend.
///
/// Field names follow the on-disk format (`method`, `backend_dns`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Literal path prefix to match.
    pub pattern: String,

    /// Allowed method tokens, case-sensitive.
    #[serde(default)]
    pub method: Vec<String>,

    /// Absolute backend base URL (e.g., "http://users-svc:8080").
    pub backend_dns: String,

    /// Per-route override of `timeouts.connect_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// Per-route override of `timeouts.response_header_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_header_timeout_secs: Option<u64>,
}

impl RouteConfig {
    /// Route with default timeouts.
    pub fn new(
        pattern: impl Into<String>,
        methods: &[&str],
        backend_dns: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            method: methods.iter().map(|m| m.to_string()).collect(),
            backend_dns: backend_dns.into(),
            connect_timeout_secs: None,
            response_header_timeout_secs: None,
        }
    }
}

/// Backend timeout defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to send response headers, in seconds.
    pub response_header_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            response_header_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus `/metrics` endpoint.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the config file and swap the route table on change.
    pub watch: bool,
}
