//! Scope token injection.
//!
//! Works on the raw query string of a qualifying request. The `scope`
//! parameter is treated as a whitespace-delimited token set; the configured
//! token is appended when missing and the whole query is re-encoded.
//! Applying the rewrite to its own output is a no-op.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::config::ScopeMatch;

/// Name of the OAuth2 scope query parameter.
pub const SCOPE_PARAM: &str = "scope";

/// Outcome of rewriting one query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRewrite {
    /// Forward the original query untouched.
    Unchanged,
    /// Forward this re-encoded query instead.
    Injected(String),
    /// The query could not be decoded losslessly; forward it untouched.
    Unparseable,
}

/// Appends one scope token to `scope` parameters that lack it.
#[derive(Debug, Clone)]
pub struct ScopeInjector {
    token: String,
    mode: ScopeMatch,
}

impl ScopeInjector {
    pub fn new(token: impl Into<String>, mode: ScopeMatch) -> Self {
        Self {
            token: token.into(),
            mode,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn is_present(&self, scope: &str) -> bool {
        match self.mode {
            ScopeMatch::Token => scope.split_whitespace().any(|t| t == self.token),
            ScopeMatch::Substring => scope.contains(self.token.as_str()),
        }
    }

    /// Returns the scope value with the token appended, or `None` when the
    /// value is blank or already carries the token.
    pub fn inject(&self, scope: &str) -> Option<String> {
        if scope.trim().is_empty() || self.is_present(scope) {
            return None;
        }
        Some(format!("{} {}", scope.trim_end(), self.token))
    }

    /// Rewrite a raw (still percent-encoded) query string.
    pub fn rewrite_query(&self, raw: &str) -> QueryRewrite {
        // Decoding is lossy on invalid UTF-8; re-encoding would corrupt it.
        if !decodes_cleanly(raw) {
            return QueryRewrite::Unparseable;
        }

        let pairs: Vec<(Cow<'_, str>, Cow<'_, str>)> =
            form_urlencoded::parse(raw.as_bytes()).collect();

        let Some((_, scope)) = pairs.iter().find(|(k, _)| k == SCOPE_PARAM) else {
            return QueryRewrite::Unchanged;
        };

        let Some(injected) = self.inject(scope) else {
            return QueryRewrite::Unchanged;
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut scope_written = false;
        for (key, value) in &pairs {
            if key == SCOPE_PARAM {
                // Later duplicates collapse into the single rewritten value.
                if !scope_written {
                    serializer.append_pair(key, &injected);
                    scope_written = true;
                }
                continue;
            }
            serializer.append_pair(key, value);
        }

        QueryRewrite::Injected(serializer.finish())
    }
}

/// True when every key and value percent-decodes to valid UTF-8.
fn decodes_cleanly(raw: &str) -> bool {
    raw.split('&')
        .flat_map(|pair| pair.splitn(2, '='))
        .all(|part| percent_decode_str(part).decode_utf8().is_ok())
}
