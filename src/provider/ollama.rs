//! Ollama client.
//!
//! Uses the native POST /api/generate endpoint with streaming disabled so
//! that images can be attached as base64 strings.

use super::{decode_json, normalize_base_url, ProviderError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate.
    pub num_predict: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            num_predict: 256,
            temperature: 0.3,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    /// Base URL (e.g., "http://localhost:11434")
    base_url: String,
    client: Arc<Client>,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, client: Arc<Client>, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            client,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a single non-streaming generation, optionally over one image.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&[u8]>,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            images: image.map(|bytes| vec![STANDARD.encode(bytes)]).unwrap_or_default(),
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let generated: GenerateResponse = decode_json(response).await?;
        Ok(generated.response)
    }
}
