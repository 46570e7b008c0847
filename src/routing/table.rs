//! Route table construction.
//!
//! # Responsibilities
//! - Turn validated `RouteConfig` entries into immutable `Route`s
//! - Preserve configuration order (first match wins)
//! - Resolve per-route backend timeouts against the global defaults

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::{RouteConfig, TimeoutConfig};
use crate::config::validation::ValidationError;
use crate::routing::matcher::PathPrefixMatcher;

/// Deadlines applied to calls against one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    /// Time allowed to establish the TCP connection.
    pub connect: Duration,
    /// Time allowed until the backend's response headers arrive.
    pub response_header: Duration,
}

impl From<&TimeoutConfig> for BackendTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response_header: Duration::from_secs(config.response_header_secs),
        }
    }
}

/// A compiled route. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Route {
    matcher: PathPrefixMatcher,
    allowed_methods: Vec<Method>,
    backend: Url,
    authority: String,
    host_header: HeaderValue,
    timeouts: BackendTimeouts,
}

impl Route {
    /// Compile one route entry, reporting every problem found in it.
    pub fn from_config(
        index: usize,
        config: &RouteConfig,
        defaults: &TimeoutConfig,
    ) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let pattern = config.pattern.as_str();

        if pattern.is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
        }

        let mut allowed_methods = Vec::with_capacity(config.method.len());
        for token in &config.method {
            match Method::from_bytes(token.as_bytes()) {
                Ok(method) => allowed_methods.push(method),
                Err(_) => errors.push(ValidationError::InvalidMethod {
                    pattern: pattern.to_string(),
                    method: token.clone(),
                }),
            }
        }

        let backend = match parse_backend(pattern, &config.backend_dns) {
            Ok(backend) => Some(backend),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let mut timeouts = BackendTimeouts::from(defaults);
        if let Some(secs) = config.connect_timeout_secs {
            match positive_secs(pattern, "connect_timeout_secs", secs) {
                Ok(d) => timeouts.connect = d,
                Err(e) => errors.push(e),
            }
        }
        if let Some(secs) = config.response_header_timeout_secs {
            match positive_secs(pattern, "response_header_timeout_secs", secs) {
                Ok(d) => timeouts.response_header = d,
                Err(e) => errors.push(e),
            }
        }

        match backend {
            Some((backend, authority, host_header)) if errors.is_empty() => Ok(Self {
                matcher: PathPrefixMatcher::new(pattern),
                allowed_methods,
                backend,
                authority,
                host_header,
                timeouts,
            }),
            _ => Err(errors),
        }
    }

    /// The literal path prefix.
    pub fn pattern(&self) -> &str {
        self.matcher.prefix()
    }

    /// Whether `path` falls under this route's prefix.
    pub fn matches_path(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Allowed methods, in configuration order.
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Case-sensitive method check.
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }

    /// Backend base URL as configured.
    pub fn backend(&self) -> &Url {
        &self.backend
    }

    /// `host[:port]` of the backend.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Value for the outbound `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    pub fn timeouts(&self) -> BackendTimeouts {
        self.timeouts
    }

    /// Serializable view for admin endpoints and the CLI.
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            pattern: self.pattern().to_string(),
            methods: self.allowed_methods.iter().map(|m| m.to_string()).collect(),
            backend: self.backend.to_string(),
            connect_timeout_secs: self.timeouts.connect.as_secs(),
            response_header_timeout_secs: self.timeouts.response_header.as_secs(),
        }
    }

    fn warn_if_suspicious(&self) {
        let pattern = self.pattern();
        if !pattern.starts_with('/') {
            tracing::warn!(pattern, "Route pattern does not start with '/' and will never match");
        }
        if pattern.ends_with('/') {
            tracing::warn!(
                pattern,
                "Route pattern ends with '/', it only matches the exact path or paths with an empty segment after it"
            );
        }
        if self.allowed_methods.is_empty() {
            tracing::warn!(pattern, "Route allows no methods, every matching request gets 405");
        }
        if self.backend.path() != "/" || self.backend.query().is_some() {
            tracing::warn!(
                pattern,
                backend = %self.backend,
                "Backend URL path and query are replaced by the rewritten request path"
            );
        }
    }
}

fn parse_backend(
    pattern: &str,
    raw: &str,
) -> Result<(Url, String, HeaderValue), ValidationError> {
    let url = Url::parse(raw).map_err(|source| ValidationError::InvalidBackendUrl {
        pattern: pattern.to_string(),
        url: raw.to_string(),
        source,
    })?;

    let missing_host = || ValidationError::MissingBackendHost {
        pattern: pattern.to_string(),
        url: raw.to_string(),
    };

    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(missing_host)?;

    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            pattern: pattern.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let host_header = HeaderValue::from_str(&authority).map_err(|_| missing_host())?;

    Ok((url, authority, host_header))
}

fn positive_secs(pattern: &str, field: &str, secs: u64) -> Result<Duration, ValidationError> {
    if secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: format!("route '{}': {}", pattern, field),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// JSON shape of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub pattern: String,
    pub methods: Vec<String>,
    pub backend: String,
    pub connect_timeout_secs: u64,
    pub response_header_timeout_secs: u64,
}

/// Ordered, immutable collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table from configuration, in configuration order.
    ///
    /// Fails with every route error found, not just the first.
    pub fn from_config(
        routes: &[RouteConfig],
        defaults: &TimeoutConfig,
    ) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(routes.len());
        let mut errors = Vec::new();

        for (index, config) in routes.iter().enumerate() {
            match Route::from_config(index, config, defaults) {
                Ok(route) => compiled.push(route),
                Err(route_errors) => errors.extend(route_errors),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        for route in &compiled {
            route.warn_if_suspicious();
        }

        Ok(Self { routes: compiled })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes.iter().map(Route::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(routes: &[RouteConfig]) -> Result<RouteTable, ConfigError> {
        RouteTable::from_config(routes, &TimeoutConfig::default())
    }

    #[test]
    fn test_preserves_configuration_order() {
        let table = build(&[
            RouteConfig::new("/b", &["GET"], "http://b"),
            RouteConfig::new("/a", &["GET"], "http://a"),
            RouteConfig::new("/b", &["POST"], "http://b2"),
        ])
        .unwrap();

        let patterns: Vec<_> = table.iter().map(Route::pattern).collect();
        assert_eq!(patterns, vec!["/b", "/a", "/b"]);
    }

    #[test]
    fn test_backend_authority_and_host_header() {
        let table = build(&[
            RouteConfig::new("/a", &["GET"], "http://users-svc:8080"),
            RouteConfig::new("/b", &["GET"], "http://users-svc"),
            RouteConfig::new("/c", &["GET"], "http://[::1]:9000/base"),
        ])
        .unwrap();

        assert_eq!(table.routes()[0].authority(), "users-svc:8080");
        assert_eq!(table.routes()[0].host_header(), "users-svc:8080");
        assert_eq!(table.routes()[1].authority(), "users-svc");
        assert_eq!(table.routes()[2].authority(), "[::1]:9000");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let table = build(&[RouteConfig::new("/a", &["GET"], "http://svc:80")]).unwrap();
        assert_eq!(table.routes()[0].authority(), "svc");
    }

    #[test]
    fn test_methods_are_case_sensitive() {
        let table = build(&[RouteConfig::new("/a", &["GET", "post"], "http://a")]).unwrap();
        let route = &table.routes()[0];

        assert!(route.allows(&Method::GET));
        assert!(!route.allows(&Method::POST));
        assert!(route.allows(&Method::from_bytes(b"post").unwrap()));
    }

    #[test]
    fn test_empty_method_list_is_legal() {
        let table = build(&[RouteConfig::new("/a", &[], "http://a")]).unwrap();
        assert!(table.routes()[0].allowed_methods().is_empty());
        assert!(!table.routes()[0].allows(&Method::GET));
    }

    #[test]
    fn test_rejects_invalid_backend_url() {
        let err = build(&[RouteConfig::new("/a", &["GET"], "not a url")]).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(matches!(errors[0], ValidationError::InvalidBackendUrl { .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_backend_without_host() {
        let err = build(&[RouteConfig::new("/a", &["GET"], "mailto:ops@example.com")]).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(matches!(errors[0], ValidationError::MissingBackendHost { .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_https_backend() {
        let err = build(&[RouteConfig::new("/a", &["GET"], "https://secure-svc")]).unwrap_err();
        assert!(err.to_string().contains("unsupported backend scheme 'https'"));
    }

    #[test]
    fn test_rejects_empty_pattern() {
        let err = build(&[RouteConfig::new("", &[], "http://a")]).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], ValidationError::EmptyPattern { index: 0 }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_invalid_method_token() {
        let err = build(&[RouteConfig::new("/a", &["GE T"], "http://a")]).unwrap_err();
        assert!(err.to_string().contains("invalid method token 'GE T'"));
    }

    #[test]
    fn test_collects_errors_across_routes() {
        let err = build(&[
            RouteConfig::new("", &["GET"], "http://a"),
            RouteConfig::new("/ok", &["GET"], "http://ok"),
            RouteConfig::new("/b", &["GET"], "ftp://b"),
        ])
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_timeout_overrides() {
        let mut route = RouteConfig::new("/a", &["GET"], "http://a");
        route.connect_timeout_secs = Some(1);
        let table = build(&[route, RouteConfig::new("/b", &["GET"], "http://b")]).unwrap();

        assert_eq!(table.routes()[0].timeouts().connect, Duration::from_secs(1));
        assert_eq!(table.routes()[0].timeouts().response_header, Duration::from_secs(30));
        assert_eq!(table.routes()[1].timeouts().connect, Duration::from_secs(5));
    }

    #[test]
    fn test_summary() {
        let table = build(&[RouteConfig::new("/users", &["GET", "POST"], "http://users-svc")]).unwrap();
        let summary = &table.summaries()[0];

        assert_eq!(summary.pattern, "/users");
        assert_eq!(summary.methods, vec!["GET", "POST"]);
        assert_eq!(summary.backend, "http://users-svc/");
    }
}
