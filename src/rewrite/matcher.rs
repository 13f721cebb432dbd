//! Qualification of requests for scope rewriting.
//!
//! # Design Decisions
//! - Path matching is an exact, case-sensitive prefix test
//! - Evaluated on the inbound path before any upstream base path is joined
//! - No regex in the hot path

use axum::http::Uri;

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the URI's path starts with the prefix.
    pub fn matches(&self, uri: &Uri) -> bool {
        uri.path().starts_with(&self.prefix)
    }
}
