//! HTTP clients for external inference providers.
//!
//! Each client wraps a shared [`reqwest::Client`] and maps transport and
//! upstream failures to [`ProviderError`]. Clients know nothing about
//! tasks or fallback; strategies in [`crate::strategy`] adapt them.

pub mod huggingface;
pub mod ollama;
pub mod openai;

pub use huggingface::HuggingFaceClient;
pub use ollama::{GenerationOptions, OllamaClient};
pub use openai::{ChatMessage, OpenAiClient};

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while calling a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider configuration error (missing token, bad URL).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else {
            ProviderError::Network(error.to_string())
        }
    }
}

/// Check the status and decode a JSON body.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await.map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to read response body: {}", e))
    })?;

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
