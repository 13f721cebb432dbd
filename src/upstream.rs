//! Upstream target and client.
//!
//! # Responsibilities
//! - Parse and validate the upstream base URL once, at startup
//! - Map an inbound path + query onto the upstream (scheme, authority, base path)
//! - Own the pooled HTTP client and enforce connect/response deadlines
//!
//! # Design Decisions
//! - Only plain `http` upstreams; TLS to the identity provider is out of scope
//! - The target is immutable and shared by every in-flight request
//! - No retries: one attempt per inbound request

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use thiserror::Error;
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::ProxyError;
use crate::resilience::timeouts::with_deadline;

/// Reasons an upstream URL is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme '{0}', only http is supported")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("URL must not carry a query or fragment")]
    UnexpectedQuery,

    #[error("invalid authority '{0}'")]
    InvalidAuthority(String),
}

/// The single upstream the proxy forwards to.
#[derive(Debug, Clone)]
pub struct Upstream {
    url: Url,
    authority: Authority,
    base_path: String,
}

impl Upstream {
    /// Parse a base URL such as `http://authelia-app:9091`.
    pub fn parse(raw: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(raw)?;

        if url.scheme() != "http" {
            return Err(UpstreamError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(UpstreamError::UnexpectedQuery);
        }

        let host = url.host_str().ok_or(UpstreamError::MissingHost)?;
        let port = url.port_or_known_default().unwrap_or(80);
        let authority_str = format!("{host}:{port}");
        let authority = Authority::from_str(&authority_str)
            .map_err(|_| UpstreamError::InvalidAuthority(authority_str))?;

        let base_path = url.path().to_string();

        Ok(Self {
            url,
            authority,
            base_path,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build the outbound URI for an inbound path and (possibly rewritten) query.
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut path_and_query = join_path(&self.base_path, path);
        if let Some(query) = query {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Join two path segments with exactly one slash between them.
fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Pooled HTTP/1.1 client bound to one upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    response_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .pool_timer(TokioTimer::new())
            .build(connector);

        Self {
            client,
            response_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send a request and wait for the response head.
    ///
    /// The body is not awaited here; it streams to the caller afterwards.
    pub async fn send(&self, req: Request<Body>) -> Result<Response<Incoming>, ProxyError> {
        with_deadline(self.response_timeout, self.client.request(req)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_target() {
        let upstream = Upstream::parse("http://authelia-app:9091").unwrap();
        assert_eq!(upstream.authority().as_str(), "authelia-app:9091");
        assert_eq!(upstream.to_string(), "http://authelia-app:9091/");
    }

    #[test]
    fn fills_in_default_port() {
        let upstream = Upstream::parse("http://idp.local").unwrap();
        assert_eq!(upstream.authority().as_str(), "idp.local:80");
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(matches!(
            Upstream::parse("not a url"),
            Err(UpstreamError::Parse(_))
        ));
        assert_eq!(
            Upstream::parse("https://idp.local").unwrap_err(),
            UpstreamError::UnsupportedScheme("https".into())
        );
        assert_eq!(
            Upstream::parse("http://idp.local/?a=b").unwrap_err(),
            UpstreamError::UnexpectedQuery
        );
    }

    #[test]
    fn uri_keeps_path_and_query() {
        let upstream = Upstream::parse("http://authelia-app:9091").unwrap();
        let uri = upstream
            .uri_for("/api/oidc/authorization", Some("scope=openid+groups"))
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "http://authelia-app:9091/api/oidc/authorization?scope=openid+groups"
        );

        let uri = upstream.uri_for("/", None).unwrap();
        assert_eq!(uri.to_string(), "http://authelia-app:9091/");
    }

    #[test]
    fn base_path_is_joined_with_single_slash() {
        assert_eq!(join_path("/", "/api"), "/api");
        assert_eq!(join_path("/auth", "/api"), "/auth/api");
        assert_eq!(join_path("/auth/", "/api"), "/auth/api");
        assert_eq!(join_path("/auth", "api"), "/auth/api");

        let upstream = Upstream::parse("http://idp.local:9091/auth/").unwrap();
        let uri = upstream.uri_for("/healthz", None).unwrap();
        assert_eq!(uri.path(), "/auth/healthz");
    }
}
