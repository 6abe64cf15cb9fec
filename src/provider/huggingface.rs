//! Hugging Face Inference API client.
//!
//! Handles the four model families the service uses:
//! - Image captioning via POST /models/{id} with raw image bytes
//! - Text generation via POST /models/{id} with `{"inputs": prompt}`
//! - Summarization via POST /models/{id} with `{"inputs": text}`
//! - Sentence similarity via POST /models/{id} with a source sentence

use super::{decode_json, normalize_base_url, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Clone)]
pub struct HuggingFaceClient {
    /// Base URL (e.g., "https://api-inference.huggingface.co")
    base_url: String,
    /// Bearer token
    token: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
struct SummaryText {
    summary_text: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    return_full_text: bool,
    max_new_tokens: u32,
}

#[derive(Serialize)]
struct SimilarityRequest<'a> {
    inputs: SimilarityInputs<'a>,
}

#[derive(Serialize)]
struct SimilarityInputs<'a> {
    source_sentence: &'a str,
    sentences: &'a [String],
}

impl HuggingFaceClient {
    pub fn new(base_url: &str, token: String, client: Arc<Client>, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token,
            client,
            timeout,
        }
    }

    /// Same client with a different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn post(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        request
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))
    }

    /// Caption an image. Returns the first `generated_text`.
    pub async fn caption(&self, model: &str, image: &[u8]) -> Result<String, ProviderError> {
        let request = self.client.post(self.model_url(model)).body(image.to_vec());
        let response = self.post(request).await?;
        let texts: Vec<GeneratedText> = decode_json(response).await?;

        texts
            .into_iter()
            .next()
            .map(|t| t.generated_text)
            .ok_or_else(|| ProviderError::InvalidResponse("Empty caption list".to_string()))
    }

    /// Generate text from an instruction prompt, without echoing the prompt.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                return_full_text: false,
                max_new_tokens,
            },
        };
        let request = self.client.post(self.model_url(model)).json(&body);
        let response = self.post(request).await?;
        let texts: Vec<GeneratedText> = decode_json(response).await?;

        texts
            .into_iter()
            .next()
            .map(|t| t.generated_text)
            .ok_or_else(|| ProviderError::InvalidResponse("Empty generation list".to_string()))
    }

    pub async fn summarize(&self, model: &str, text: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({ "inputs": text });
        let request = self.client.post(self.model_url(model)).json(&body);
        let response = self.post(request).await?;
        let summaries: Vec<SummaryText> = decode_json(response).await?;

        summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| ProviderError::InvalidResponse("Empty summary list".to_string()))
    }

    /// Similarity of `source` against each of `sentences`, in order.
    pub async fn similarity(
        &self,
        model: &str,
        source: &str,
        sentences: &[String],
    ) -> Result<Vec<f64>, ProviderError> {
        let body = SimilarityRequest {
            inputs: SimilarityInputs {
                source_sentence: source,
                sentences,
            },
        };
        let request = self.client.post(self.model_url(model)).json(&body);
        let response = self.post(request).await?;
        decode_json(response).await
    }
}
