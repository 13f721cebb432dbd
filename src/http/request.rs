//! Outbound request construction.
//!
//! # Responsibilities
//! - Point the inbound request at the upstream (scheme, authority, base path)
//! - Substitute the rewritten query when one was produced
//! - Prepare headers for forwarding (hop-by-hop, X-Forwarded-For, Host)
//!
//! # Design Decisions
//! - Method, body and end-to-end headers are moved, never copied or buffered
//! - The inbound Host header is kept so the upstream sees the public host
//! - Outbound requests are HTTP/1.1 whatever the inbound version

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{self, HeaderValue};
use axum::http::request::Parts;
use axum::http::{Request, Version};

use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::http::upgrade::restore_handshake;
use crate::upstream::Upstream;

/// Build the request sent to the upstream.
///
/// `query` is the raw query to forward: the inbound one, or its rewrite.
/// `upgrade` carries the requested protocol when the caller asked for one.
pub fn build_outbound(
    parts: Parts,
    body: Body,
    upstream: &Upstream,
    query: Option<&str>,
    client_addr: SocketAddr,
    upgrade: Option<HeaderValue>,
) -> Result<Request<Body>, axum::http::Error> {
    let uri = upstream.uri_for(parts.uri.path(), query)?;

    let mut headers = parts.headers;
    if !headers.contains_key(header::HOST) {
        // HTTP/2 callers send :authority instead of Host.
        if let Some(authority) = parts.uri.authority() {
            if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                headers.insert(header::HOST, host);
            }
        }
    }
    strip_hop_by_hop(&mut headers);
    append_forwarded_for(&mut headers, client_addr.ip());
    if let Some(protocol) = upgrade {
        restore_handshake(&mut headers, protocol);
    }

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.version_mut() = Version::HTTP_11;
    *outbound.headers_mut() = headers;
    Ok(outbound)
}
