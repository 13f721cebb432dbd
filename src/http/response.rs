//! Response relay.
//!
//! # Responsibilities
//! - Hand the upstream response back to the caller
//! - Strip hop-by-hop headers
//! - Cut off bodies whose upstream goes quiet
//!
//! # Design Decisions
//! - Streaming: the upstream body is wrapped, never collected
//! - The idle bound applies per frame, not to the whole body
//! - Status and end-to-end headers are returned unchanged
//! - 101 responses keep their handshake headers intact
//! - Transport failures are mapped in `crate::error` (502/504)

use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use hyper::body::Incoming;
use tower_http::timeout::TimeoutBody;

use crate::http::headers::strip_hop_by_hop;

/// Convert an upstream response into the caller's response.
///
/// The body errors out if the upstream sends no frame for `body_idle`.
pub fn relay(response: Response<Incoming>, body_idle: Duration) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    if parts.status != StatusCode::SWITCHING_PROTOCOLS {
        strip_hop_by_hop(&mut parts.headers);
    }
    Response::from_parts(parts, Body::new(TimeoutBody::new(body_idle, body)))
}
