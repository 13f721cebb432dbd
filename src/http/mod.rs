//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, liveness route vs. catch-all forward)
//!     → rewrite (scope injection on qualifying paths)
//!     → request.rs (retarget URI, prepare headers)
//!     → upstream client (deadline-bounded send)
//!     → response.rs (relay status, headers, streamed body)
//!     → Send to client
//! ```

pub mod headers;
pub mod health;
pub mod request;
pub mod response;
pub mod server;
pub mod upgrade;

pub use server::HttpServer;
