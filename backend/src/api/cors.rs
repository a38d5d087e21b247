//! Cross-origin policy
//!
//! Every response carries the same permissive headers. `OPTIONS` on any path
//! is answered here without reaching a handler.

use axum::{
    extract::Request,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Methods advertised on every response
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Methods advertised by the schema endpoint
pub const GRAPHQL_ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Request headers clients may send
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Gateway-wide CORS middleware
///
/// Headers already set by an inner layer are left alone.
pub async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut(), ALLOW_METHODS);
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut(), ALLOW_METHODS);
    response
}

/// Narrower method list for the schema endpoint
pub async fn graphql_cors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut(), GRAPHQL_ALLOW_METHODS);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, methods: &'static str) {
    headers
        .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));
    headers
        .entry(ACCESS_CONTROL_ALLOW_METHODS)
        .or_insert(HeaderValue::from_static(methods));
    headers
        .entry(ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(ALLOW_HEADERS));
}
