//! OIDC scope injection proxy.
//!
//! Sits in front of an identity provider, forwards every request to a single
//! upstream, and makes sure authorization requests ask for one extra scope
//! token (by default `groups`).
//!
//! ```text
//!     Client ──▶ http::server ──┬── /healthz ──▶ "OK" (local)
//!                               │
//!                               └── rewrite (scope on /api/oidc/authorization)
//!                                     ──▶ http::request ──▶ upstream ──▶ IdP
//!     Client ◀── http::response ◀──────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod rewrite;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, ShutdownSignal};
