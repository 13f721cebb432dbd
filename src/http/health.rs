//! Local liveness endpoint.
//!
//! Answers from this process only; the upstream is never contacted, so the
//! probe reports whether the proxy itself is accepting connections.

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Handler for the configured health path, any method.
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
