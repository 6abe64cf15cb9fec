//! Strategies command handler

use crate::cli::output::{format_chains_table, ProviderView};
use crate::cli::StrategiesArgs;
use crate::config::UpkeepConfig;
use crate::registry::{Credentials, StrategyRegistry};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;

/// Enabled state of each provider after credential lookup.
pub fn provider_views(config: &UpkeepConfig, credentials: &Credentials) -> Vec<ProviderView> {
    let providers = &config.providers;

    let hosted = |name: &str, enabled: bool, credential: bool, env: &str| {
        if !enabled {
            ProviderView {
                name: name.to_string(),
                enabled: false,
                note: Some("disabled in config".to_string()),
            }
        } else if !credential {
            ProviderView {
                name: name.to_string(),
                enabled: false,
                note: Some(format!("{} not set", env)),
            }
        } else {
            ProviderView {
                name: name.to_string(),
                enabled: true,
                note: None,
            }
        }
    };

    vec![
        hosted("ollama", providers.ollama.enabled, true, ""),
        hosted(
            "huggingface",
            providers.huggingface.enabled,
            credentials.huggingface_token.is_some(),
            &providers.huggingface.token_env,
        ),
        hosted(
            "openai",
            providers.openai.enabled,
            credentials.openai_api_key.is_some(),
            &providers.openai.api_key_env,
        ),
    ]
}

/// Handle `upkeep strategies` command
pub fn handle_strategies(args: &StrategiesArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = if args.config.exists() {
        UpkeepConfig::load(Some(&args.config))?
    } else {
        UpkeepConfig::default()
    }
    .with_env_overrides();

    let credentials = Credentials::from_env(&config.providers);
    let providers = provider_views(&config, &credentials);
    // Building chains performs no I/O
    let registry =
        StrategyRegistry::with_credentials(&config, Arc::new(Client::new()), credentials);

    if args.json {
        Ok(serde_json::to_string_pretty(&json!({
            "chains": registry.chains(),
            "providers": providers,
        }))?)
    } else {
        Ok(format_chains_table(&registry.chains(), &providers))
    }
}
