//! Protocol upgrade passthrough (e.g. WebSocket).
//!
//! The `Connection`/`Upgrade` pair is hop-by-hop, so it is re-attached to
//! the outbound request explicitly. Once the upstream answers 101 both sides
//! are upgraded and bytes are spliced until either end closes.

use std::net::SocketAddr;

use axum::http::header::{self, HeaderMap, HeaderValue};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

use crate::http::headers::connection_tokens;

/// The requested `Upgrade` protocol, if the request asks to upgrade.
pub fn requested_protocol(headers: &HeaderMap) -> Option<HeaderValue> {
    let wants_upgrade = connection_tokens(headers).any(|t| t.eq_ignore_ascii_case("upgrade"));
    if !wants_upgrade {
        return None;
    }
    headers.get(header::UPGRADE).cloned()
}

/// Put the upgrade handshake headers back after hop-by-hop stripping.
pub fn restore_handshake(headers: &mut HeaderMap, protocol: HeaderValue) {
    headers.insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
    headers.insert(header::UPGRADE, protocol);
}

/// Splice the caller's and the upstream's upgraded connections.
pub fn spawn_tunnel(client: OnUpgrade, upstream: OnUpgrade, peer: SocketAddr) {
    tokio::spawn(async move {
        let (client, upstream) = match tokio::try_join!(client, upstream) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(client = %peer, error = %e, "Protocol upgrade failed");
                return;
            }
        };

        let mut client = TokioIo::new(client);
        let mut upstream = TokioIo::new(upstream);
        match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
            Ok((sent, received)) => {
                tracing::debug!(client = %peer, sent, received, "Upgraded connection closed");
            }
            Err(e) => {
                tracing::debug!(client = %peer, error = %e, "Upgraded connection aborted");
            }
        }
    });
}
