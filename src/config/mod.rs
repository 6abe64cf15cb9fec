//! Configuration module for Upkeep
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`UPKEEP_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! Provider secrets are read from the environment variables named in the
//! `[providers.*]` sections, never from the file itself.
//!
//! # Example
//!
//! ```rust
//! use upkeep::config::UpkeepConfig;
//!
//! let config = UpkeepConfig::default();
//! assert_eq!(config.server.port, 8000);
//!
//! let toml = r#"
//! [analysis]
//! default_locale = "es"
//! "#;
//! let config: UpkeepConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.analysis.default_locale.code(), "es");
//! ```

pub mod analysis;
pub mod error;
pub mod logging;
pub mod providers;
pub mod server;

pub use analysis::AnalysisConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use providers::{HuggingFaceConfig, OllamaConfig, OpenAiConfig, ProvidersConfig};
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Upkeep server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpkeepConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub providers: ProvidersConfig,
}

impl UpkeepConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports UPKEEP_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("UPKEEP_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("UPKEEP_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("UPKEEP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("UPKEEP_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(locale) = std::env::var("UPKEEP_LOCALE") {
            if let Ok(l) = locale.parse() {
                self.analysis.default_locale = l;
            }
        }
        if let Ok(url) = std::env::var("UPKEEP_OLLAMA_URL") {
            if !url.trim().is_empty() {
                self.providers.ollama.url = url;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "port must be non-zero"));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.max_body_bytes",
                "body limit must be positive",
            ));
        }

        if self.analysis.min_caption_chars == 0 {
            return Err(ConfigError::invalid(
                "analysis.min_caption_chars",
                "must be greater than zero",
            ));
        }
        if self.analysis.max_images_per_request == 0 {
            return Err(ConfigError::invalid(
                "analysis.max_images_per_request",
                "must be greater than zero",
            ));
        }
        if self.analysis.summary_max_words == 0 || self.analysis.summary_max_sentences == 0 {
            return Err(ConfigError::invalid(
                "analysis.summary_max_words",
                "summary caps must be greater than zero",
            ));
        }

        let hf = &self.providers.huggingface;
        if hf.enabled {
            if hf.base_url.is_empty() {
                return Err(ConfigError::invalid(
                    "providers.huggingface.base_url",
                    "URL cannot be empty",
                ));
            }
            if hf.timeout_seconds == 0 || hf.similarity_timeout_seconds == 0 {
                return Err(ConfigError::invalid(
                    "providers.huggingface.timeout_seconds",
                    "timeouts must be positive",
                ));
            }
        }

        let ollama = &self.providers.ollama;
        if ollama.enabled {
            if ollama.url.is_empty() {
                return Err(ConfigError::invalid(
                    "providers.ollama.url",
                    "URL cannot be empty",
                ));
            }
            if ollama.timeout_seconds == 0 {
                return Err(ConfigError::invalid(
                    "providers.ollama.timeout_seconds",
                    "timeout must be positive",
                ));
            }
        }

        let openai = &self.providers.openai;
        if openai.enabled {
            if openai.base_url.is_empty() {
                return Err(ConfigError::invalid(
                    "providers.openai.base_url",
                    "URL cannot be empty",
                ));
            }
            if openai.timeout_seconds == 0 {
                return Err(ConfigError::invalid(
                    "providers.openai.timeout_seconds",
                    "timeout must be positive",
                ));
            }
        }

        Ok(())
    }
}
