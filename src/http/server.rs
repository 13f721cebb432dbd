//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the liveness route and the forwarding handler
//! - Wire up middleware (tracing spans with request IDs)
//! - Bind server to listener, drain on shutdown
//! - Rewrite qualifying requests and forward everything to the upstream

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Span;
use uuid::Uuid;

use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::error::ProxyError;
use crate::http::health::liveness;
use crate::http::request::build_outbound;
use crate::http::response::relay;
use crate::http::upgrade;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::rewrite::{QueryRewrite, ScopeRewriter};
use crate::upstream::{Upstream, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<Upstream>,
    pub client: UpstreamClient,
    pub rewriter: Arc<ScopeRewriter>,
    pub body_idle: Duration,
}

/// HTTP server for the scope proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let upstream = Upstream::parse(&config.upstream.url)
            .map_err(|e| ConfigError::Validation(vec![e.into()]))?;

        let state = AppState {
            upstream: Arc::new(upstream),
            client: UpstreamClient::new(&config.timeouts),
            rewriter: Arc::new(ScopeRewriter::from_config(&config.rewrite)),
            body_idle: Duration::from_secs(config.timeouts.body_idle_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.health.path, any(liveness))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http().make_span_with(request_span)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            path_prefix = %self.config.rewrite.path_prefix,
            scope = %self.config.rewrite.scope,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.stopped().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Main proxy handler.
/// Rewrites the scope of qualifying requests and forwards to the upstream.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let query = outbound_query(&state.rewriter, request.uri(), client_addr);

    let upgrade_protocol = upgrade::requested_protocol(request.headers());
    let client_upgrade = upgrade_protocol
        .is_some()
        .then(|| hyper::upgrade::on(&mut request));

    let (parts, body) = request.into_parts();
    let outbound = match build_outbound(
        parts,
        body,
        &state.upstream,
        query.as_deref(),
        client_addr,
        upgrade_protocol,
    ) {
        Ok(outbound) => outbound,
        Err(e) => return upstream_failure(ProxyError::from(e), &method, client_addr, start_time),
    };

    match state.client.send(outbound).await {
        Ok(mut response) => {
            let status = response.status();
            if status == StatusCode::SWITCHING_PROTOCOLS {
                if let Some(client_upgrade) = client_upgrade {
                    upgrade::spawn_tunnel(
                        client_upgrade,
                        hyper::upgrade::on(&mut response),
                        client_addr,
                    );
                }
            }
            metrics::record_request(method.as_str(), status.as_u16(), start_time);
            relay(response, state.body_idle)
        }
        Err(e) => upstream_failure(e, &method, client_addr, start_time),
    }
}

/// Pick the query to forward, logging and counting an injection only when
/// the query was actually rewritten.
fn outbound_query(
    rewriter: &ScopeRewriter,
    uri: &Uri,
    client_addr: SocketAddr,
) -> Option<String> {
    match rewriter.rewrite(uri) {
        QueryRewrite::Injected(query) => {
            tracing::info!(
                client = %client_addr,
                scope = rewriter.token(),
                "Injected scope into authorization request"
            );
            metrics::record_scope_injection();
            Some(query)
        }
        QueryRewrite::Unparseable => {
            tracing::warn!(
                client = %client_addr,
                path = %uri.path(),
                "Unparseable authorization query, forwarding unchanged"
            );
            uri.query().map(str::to_owned)
        }
        QueryRewrite::Unchanged => uri.query().map(str::to_owned),
    }
}

fn upstream_failure(
    error: ProxyError,
    method: &axum::http::Method,
    client_addr: SocketAddr,
    start_time: Instant,
) -> Response {
    tracing::error!(client = %client_addr, method = %method, error = %error, "Upstream error");
    metrics::record_request(method.as_str(), error.status().as_u16(), start_time);
    error.into_response()
}
