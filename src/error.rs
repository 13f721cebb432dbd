//! Per-request forwarding errors.
//!
//! Every variant is terminal for the request that produced it; the caller
//! gets a gateway-class status and a short plain-text body. Nothing is
//! retried.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connect failure, reset, or malformed upstream response.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// Upstream did not produce response headers in time.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The outbound request could not be assembled.
    #[error("could not build upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) | ProxyError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match self {
            ProxyError::Timeout(_) => "Upstream timed out",
            _ => "Upstream request failed",
        };
        (self.status(), body).into_response()
    }
}
