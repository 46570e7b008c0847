//! Terminal responses produced by the gateway itself.
//!
//! # Design Decisions
//! - Backend responses are never touched; only routing and transport
//!   failures get a gateway-authored response
//! - 405 carries an `Allow` header listing the matched route's methods
//! - Transport failures and timeouts alike become 502 Bad Gateway

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Response, StatusCode};

fn plain(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// No route matched the path.
pub fn not_found() -> Response<Body> {
    plain(StatusCode::NOT_FOUND, "404 page not found")
}

/// The matched route does not allow the request method.
pub fn method_not_allowed(allowed: &[Method]) -> Response<Body> {
    let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// The backend could not be reached or did not answer in time.
pub fn bad_gateway() -> Response<Body> {
    plain(StatusCode::BAD_GATEWAY, "Bad Gateway")
}
