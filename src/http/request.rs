//! Request identification.
//!
//! Every request carries an `x-request-id`: the client's if it sent one,
//! otherwise a generated UUID. The id is attached to the request span and
//! echoed on the response.

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use tracing::Span;

/// Request ID header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request id, or `"unknown"` if the header is missing or not UTF-8.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for `TraceLayer`, tagged with the request id.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}
