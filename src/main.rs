use std::path::PathBuf;

use clap::Parser;

use oidc_scope_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use oidc_scope_proxy::lifecycle::startup;
use oidc_scope_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "oidc-scope-proxy", version)]
#[command(about = "Injects a scope into OIDC authorization requests bound for the identity provider", long_about = None)]
struct Cli {
    /// TOML configuration file (all settings default when omitted)
    #[arg(short, long, env = "SCOPE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.url
    #[arg(long)]
    upstream: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.url = upstream;
    }

    init_logging(&config.observability)?;
    tracing::info!("oidc-scope-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    validate_config(&config).map_err(ConfigError::Validation)?;
    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
