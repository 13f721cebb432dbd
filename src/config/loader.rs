//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document into a configuration.
///
/// Validation is left to the caller so command-line overrides can be
/// applied first.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            url = "http://idp.internal:9091"

            [rewrite]
            path_prefix = "/oauth2/authorize"
            scope = "roles"

            [timeouts]
            request_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upstream.url, "http://idp.internal:9091");
        assert_eq!(config.rewrite.path_prefix, "/oauth2/authorize");
        assert_eq!(config.rewrite.scope, "roles");
        assert_eq!(config.timeouts.request_secs, 10);
        assert_eq!(config.timeouts.connect_secs, 5);
    }

    #[test]
    fn syntax_errors_surface_as_parse() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::ZeroTimeout("connect_secs"),
            ValidationError::InvalidScopeToken(String::new()),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.connect_secs must be greater than zero, \
             rewrite.scope: '' must be a single non-empty token"
        );
    }
}
