//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths, the scope token and timeout ranges
//! - Confirm the upstream URL is usable before any traffic is served
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::upstream::{Upstream, UpstreamError};

/// A single semantic problem with a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.url: {0}")]
    InvalidUpstream(#[from] UpstreamError),

    #[error("{field}: '{value}' must start with '/'")]
    RelativePath { field: &'static str, value: String },

    #[error("health.path: '{0}' must be a literal path other than '/'")]
    InvalidHealthPath(String),

    #[error("rewrite.scope: '{0}' must be a single non-empty token")]
    InvalidScopeToken(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Err(e) = Upstream::parse(&config.upstream.url) {
        errors.push(ValidationError::InvalidUpstream(e));
    }

    check_path(&mut errors, "health.path", &config.health.path);
    let health = &config.health.path;
    if health == "/" || health.contains(['{', '}', '*']) {
        errors.push(ValidationError::InvalidHealthPath(health.clone()));
    }
    check_path(&mut errors, "rewrite.path_prefix", &config.rewrite.path_prefix);

    let scope = &config.rewrite.scope;
    if scope.is_empty() || scope.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidScopeToken(scope.clone()));
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("idle_secs", config.timeouts.idle_secs),
        ("body_idle_secs", config.timeouts.body_idle_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field,
            value: value.to_string(),
        });
    }
}
