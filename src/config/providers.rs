//! External provider configuration
//!
//! Credentials are never stored in the config file. Each section names the
//! environment variable holding its secret; a missing or empty variable
//! leaves the provider out of every chain.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub huggingface: HuggingFaceConfig,
    pub ollama: OllamaConfig,
    pub openai: OpenAiConfig,
}

impl ProvidersConfig {
    /// Turn every provider off, leaving only rule-based strategies.
    pub fn disable_all(&mut self) {
        self.huggingface.enabled = false;
        self.ollama.enabled = false;
        self.openai.enabled = false;
    }
}

/// Hugging Face Inference API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Environment variable holding the API token
    pub token_env: String,
    pub caption_model: String,
    pub summarize_model: String,
    pub urgency_model: String,
    pub similarity_model: String,
    pub timeout_seconds: u64,
    pub similarity_timeout_seconds: u64,
    pub priority: u32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: crate::provider::huggingface::DEFAULT_BASE_URL.to_string(),
            token_env: "HF_API_KEY".to_string(),
            caption_model: "Salesforce/blip-image-captioning-large".to_string(),
            summarize_model: "facebook/bart-large-cnn".to_string(),
            urgency_model: "mistralai/Mistral-7B-Instruct-v0.1".to_string(),
            similarity_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            timeout_seconds: 30,
            similarity_timeout_seconds: 15,
            priority: 20,
        }
    }
}

impl HuggingFaceConfig {
    pub fn token(&self) -> Option<String> {
        read_secret(&self.token_env)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn similarity_timeout(&self) -> Duration {
        Duration::from_secs(self.similarity_timeout_seconds)
    }
}

/// Local Ollama server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub url: String,
    /// Multimodal model used for captions
    pub vision_model: String,
    /// Text model used for expand, translate and summarize
    pub text_model: String,
    pub timeout_seconds: u64,
    pub priority: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: crate::provider::ollama::DEFAULT_OLLAMA_URL.to_string(),
            vision_model: "llava".to_string(),
            text_model: "llama3.2".to_string(),
            timeout_seconds: 60,
            priority: 10,
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// OpenAI-compatible chat API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub priority: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: crate::provider::openai::DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 30,
            priority: 30,
        }
    }
}

impl OpenAiConfig {
    pub fn api_key(&self) -> Option<String> {
        read_secret(&self.api_key_env)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn read_secret(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let config = ProvidersConfig::default();
        assert!(config.huggingface.enabled);
        assert_eq!(config.huggingface.token_env, "HF_API_KEY");
        assert_eq!(config.huggingface.timeout(), Duration::from_secs(30));
        assert_eq!(config.huggingface.similarity_timeout(), Duration::from_secs(15));
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.openai.api_key_env, "OPENAI_API_KEY");
        assert!(config.ollama.priority < config.huggingface.priority);
        assert!(config.huggingface.priority < config.openai.priority);
    }

    #[test]
    fn test_disable_all() {
        let mut config = ProvidersConfig::default();
        config.disable_all();
        assert!(!config.huggingface.enabled);
        assert!(!config.ollama.enabled);
        assert!(!config.openai.enabled);
    }

    #[test]
    fn test_missing_secret_is_none() {
        let config = HuggingFaceConfig {
            token_env: "UPKEEP_TEST_UNSET_TOKEN_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_blank_secret_is_none() {
        std::env::set_var("UPKEEP_TEST_BLANK_KEY", "   ");
        let config = OpenAiConfig {
            api_key_env: "UPKEEP_TEST_BLANK_KEY".to_string(),
            ..Default::default()
        };
        let key = config.api_key();
        std::env::remove_var("UPKEEP_TEST_BLANK_KEY");

        assert_eq!(key, None);
    }

    #[test]
    fn test_secret_is_read_from_named_var() {
        std::env::set_var("UPKEEP_TEST_HF_TOKEN", "hf_abc");
        let config = HuggingFaceConfig {
            token_env: "UPKEEP_TEST_HF_TOKEN".to_string(),
            ..Default::default()
        };
        let token = config.token();
        std::env::remove_var("UPKEEP_TEST_HF_TOKEN");

        assert_eq!(token.as_deref(), Some("hf_abc"));
    }
}
