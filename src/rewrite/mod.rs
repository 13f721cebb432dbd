//! Request rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound URI (path, raw query)
//!     → matcher.rs (does the path qualify?)
//!     → scope.rs (parse query, append token if missing, re-encode)
//!     → Return: QueryRewrite (Unchanged | Injected | Unparseable)
//! ```
//!
//! # Design Decisions
//! - Built once from config, immutable at runtime (shared without locks)
//! - Only the query string of qualifying requests is ever touched
//! - A parse failure degrades to pass-through, never to an error response

pub mod matcher;
pub mod scope;

use axum::http::Uri;

pub use matcher::PathPrefixMatcher;
pub use scope::{QueryRewrite, ScopeInjector, SCOPE_PARAM};

use crate::config::RewriteConfig;

/// Decides which requests qualify and rewrites their scope.
#[derive(Debug, Clone)]
pub struct ScopeRewriter {
    matcher: PathPrefixMatcher,
    injector: ScopeInjector,
}

impl ScopeRewriter {
    pub fn new(matcher: PathPrefixMatcher, injector: ScopeInjector) -> Self {
        Self { matcher, injector }
    }

    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new(
            PathPrefixMatcher::new(config.path_prefix.clone()),
            ScopeInjector::new(config.scope.clone(), config.match_mode),
        )
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn token(&self) -> &str {
        self.injector.token()
    }

    /// Rewrite the query of `uri` if its path qualifies.
    pub fn rewrite(&self, uri: &Uri) -> QueryRewrite {
        if !self.matcher.matches(uri) {
            return QueryRewrite::Unchanged;
        }
        match uri.query() {
            Some(query) => self.injector.rewrite_query(query),
            None => QueryRewrite::Unchanged,
        }
    }
}
