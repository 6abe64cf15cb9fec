//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{ConfigError, LogFormat, UpkeepConfig};
use crate::registry::StrategyRegistry;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &ServeArgs) -> Result<UpkeepConfig, ConfigError> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        UpkeepConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        UpkeepConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides have the highest priority
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.offline {
        config.providers.disable_all();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(config: &crate::config::LoggingConfig) -> anyhow::Result<()> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if config.enable_content_logging {
        eprintln!("WARNING: Content logging is enabled. Tenant text and captions will be logged.");
        eprintln!("         This may include personal data. Use only for debugging.");
    }

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Shared outbound HTTP client for every provider.
pub fn build_http_client(config: &UpkeepConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.request_timeout_seconds))
        .pool_max_idle_per_host(10)
        .build()
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args).context("failed to load configuration")?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting Upkeep server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build the strategy chains once
    let client = Arc::new(build_http_client(&config).context("failed to build HTTP client")?);
    let strategies = Arc::new(StrategyRegistry::from_config(&config, client));
    let external = strategies.external_strategy_count();
    if external == 0 {
        tracing::warn!("No provider strategies configured, every task is rule-based");
    } else {
        tracing::info!(strategies = external, "Provider strategies registered");
    }

    // 4. Build API router
    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(Arc::clone(&config), strategies));
    let app = create_router(app_state);

    // 5. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Upkeep API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Upkeep server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
            offline: false,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let mut serve_args = args(temp.path().to_path_buf());
        serve_args.port = Some(9000);
        serve_args.log_level = Some("debug".to_string());

        let config = load_config_with_overrides(&serve_args).unwrap();
        assert_eq!(config.server.port, 9000); // CLI wins
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_serve_works_without_config_file() {
        let config = load_config_with_overrides(&args(PathBuf::from("nonexistent.toml"))).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_offline_disables_providers() {
        let mut serve_args = args(PathBuf::from("nonexistent.toml"));
        serve_args.offline = true;

        let config = load_config_with_overrides(&serve_args).unwrap();
        assert!(!config.providers.ollama.enabled);
        assert!(!config.providers.huggingface.enabled);
        assert!(!config.providers.openai.enabled);
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport = ").unwrap();

        let result = load_config_with_overrides(&args(temp.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_http_client_builds() {
        let client = build_http_client(&UpkeepConfig::default()).unwrap();
        assert!(client.get("http://localhost").build().is_ok());
    }
}
