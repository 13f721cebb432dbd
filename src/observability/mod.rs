//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding handler produces:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every request runs in a span carrying a generated request ID
//! - Scope injections are logged once each, with the caller address
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
