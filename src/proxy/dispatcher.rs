//! Request forwarding.
//!
//! # Responsibilities
//! - Point the inbound request at the matched backend
//! - Rewrite `Host` to the backend authority, drop hop-by-hop headers,
//!   copy everything else
//! - Stream the backend response back, minus its hop-by-hop headers
//! - Map transport failures to `DispatchError`
//!
//! # Design Decisions
//! - One pooled client per route so connect timeouts can differ per backend
//! - Bodies are streamed in both directions, never buffered
//! - No retries: a failed call is reported once and the caller answers 502
//! - Dropping the forward future drops the in-flight backend call

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response, Uri, Version};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::proxy::error::DispatchError;
use crate::resilience::timeouts;
use crate::routing::{Route, RouteTable};

type HttpClient = Client<HttpConnector, Body>;

/// Headers that describe one connection and never cross the proxy.
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards matched requests to their backends.
#[derive(Clone)]
pub struct ProxyDispatcher {
    clients: Vec<HttpClient>,
}

impl ProxyDispatcher {
    /// Build one client per route, honoring that route's connect timeout.
    pub fn new(table: &RouteTable) -> Self {
        let clients = table
            .iter()
            .map(|route| {
                Client::builder(TokioExecutor::new())
                    .build(timeouts::connector(route.timeouts()))
            })
            .collect();
        Self { clients }
    }

    /// Forward `request` to `route`'s backend at `outbound_path`.
    ///
    /// `index` is the route's position in the table this dispatcher was built from.
    pub async fn forward(
        &self,
        index: usize,
        route: &Route,
        outbound_path: &str,
        request: Request<Body>,
    ) -> Result<Response<Body>, DispatchError> {
        let client = self
            .clients
            .get(index)
            .ok_or(DispatchError::UnknownRoute(index))?;

        let outbound = build_outbound_request(route, outbound_path, request)?;
        tracing::debug!(uri = %outbound.uri(), "Forwarding to backend");

        let limit = route.timeouts().response_header;
        let response: Response<Incoming> = timeouts::within(limit, client.request(outbound))
            .await
            .ok_or(DispatchError::ResponseTimeout(limit))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// `http://<backend authority><outbound_path>[?query]`.
pub fn outbound_uri(
    route: &Route,
    outbound_path: &str,
    query: Option<&str>,
) -> Result<Uri, DispatchError> {
    let uri = match query {
        Some(query) => format!("http://{}{}?{}", route.authority(), outbound_path, query),
        None => format!("http://{}{}", route.authority(), outbound_path),
    };
    Ok(Uri::try_from(uri)?)
}

/// Re-target the inbound request at the backend.
///
/// Method, end-to-end headers and body carry over; `Host` is replaced and the
/// request is sent as HTTP/1.1 whatever the inbound version was.
pub fn build_outbound_request(
    route: &Route,
    outbound_path: &str,
    request: Request<Body>,
) -> Result<Request<Body>, DispatchError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = outbound_uri(route, outbound_path, parts.uri.query())?;
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    parts.headers.insert(header::HOST, route.host_header().clone());
    parts.extensions.clear();

    Ok(Request::from_parts(parts, body))
}

/// Remove the fixed hop-by-hop set and every header `Connection` names.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, TimeoutConfig};
    use axum::http::Method;

    fn route(backend: &str) -> Route {
        let config = RouteConfig::new("/users", &["GET", "POST"], backend);
        Route::from_config(0, &config, &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn test_outbound_uri_keeps_query() {
        let route = route("http://users-svc");
        let uri = outbound_uri(&route, "/42", Some("x=1&y=2")).unwrap();
        assert_eq!(uri.to_string(), "http://users-svc/42?x=1&y=2");
    }

    #[test]
    fn test_outbound_uri_replaces_backend_path() {
        let route = route("http://users-svc:9000/base?debug=1");
        let uri = outbound_uri(&route, "/", None).unwrap();
        assert_eq!(uri.to_string(), "http://users-svc:9000/");
    }

    #[test]
    fn test_outbound_request_rewrites_host_only() {
        let route = route("http://users-svc:8080");
        let inbound = Request::builder()
            .method(Method::POST)
            .uri("http://gateway.local/users/42?x=1")
            .version(Version::HTTP_2)
            .header(header::HOST, "gateway.local")
            .header("x-custom", "kept")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let outbound = build_outbound_request(&route, "/42", inbound).unwrap();

        assert_eq!(outbound.method(), Method::POST);
        assert_eq!(outbound.uri(), "http://users-svc:8080/42?x=1");
        assert_eq!(outbound.version(), Version::HTTP_11);
        assert_eq!(outbound.headers()[header::HOST], "users-svc:8080");
        assert_eq!(outbound.headers()["x-custom"], "kept");
        assert_eq!(outbound.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(outbound.headers().get_all(header::HOST).iter().count(), 1);
    }

    #[test]
    fn test_hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive, X-Session-Hop".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert("x-session-hop", "1".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::UPGRADE, "websocket".parse().unwrap());
        headers.insert(header::PROXY_AUTHORIZATION, "Basic Zm9v".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer kept".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        let mut left: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
        left.sort_unstable();
        assert_eq!(left, vec!["authorization", "content-type"]);
    }

    #[test]
    fn test_host_added_when_missing() {
        let route = route("http://users-svc");
        let inbound = Request::builder().uri("/users").body(Body::empty()).unwrap();

        let outbound = build_outbound_request(&route, "/", inbound).unwrap();
        assert_eq!(outbound.headers()[header::HOST], "users-svc");
        assert_eq!(outbound.uri(), "http://users-svc/");
    }
}
