//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → connect timeout (HttpConnector)
//!     → timeouts.rs (deadline for response headers)
//!     → On failure: 502/504 to the caller, no retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries, backoff or circuit breaking: each request is single-shot

pub mod timeouts;
