//! Shared test utilities for Upkeep integration tests.
//!
//! Provides image fixtures, multipart body builders, and app constructors
//! wired with explicit credentials so tests never read the environment.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use reqwest::Client;
use std::io::Cursor;
use std::sync::Arc;
use upkeep::api::{create_router, AppState};
use upkeep::config::UpkeepConfig;
use upkeep::registry::{Credentials, StrategyRegistry};

/// Multipart boundary used by every test request.
pub const BOUNDARY: &str = "upkeep-test-boundary";

// =============================================================================
// Fixtures
// =============================================================================

/// Encode a blank RGB image of the given size as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

/// One file part of a multipart form.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

impl<'a> FilePart<'a> {
    pub fn png(field: &'a str, filename: &'a str, width: u32, height: u32) -> Self {
        Self {
            field,
            filename,
            content_type: "image/png",
            bytes: png_bytes(width, height),
        }
    }

    pub fn text(field: &'a str, filename: &'a str, content: &str) -> Self {
        Self {
            field,
            filename,
            content_type: "text/plain",
            bytes: content.as_bytes().to_vec(),
        }
    }
}

/// Build a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

// =============================================================================
// Requests
// =============================================================================

pub fn multipart_request(uri: &str, parts: &[FilePart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// App Builders
// =============================================================================

/// Router over the given config and credentials, built like `serve` does.
pub fn app_with(config: UpkeepConfig, credentials: Credentials) -> axum::Router {
    let strategies = StrategyRegistry::with_credentials(&config, Arc::new(Client::new()), credentials);
    app_with_registry(config, strategies)
}

/// Router over a hand-built registry.
pub fn app_with_registry(config: UpkeepConfig, strategies: StrategyRegistry) -> axum::Router {
    let state = Arc::new(AppState::new(Arc::new(config), Arc::new(strategies)));
    create_router(state)
}

/// Router where every chain is rule-based.
pub fn offline_app() -> axum::Router {
    let mut config = UpkeepConfig::default();
    config.providers.disable_all();
    app_with(config, Credentials::default())
}

/// Config whose providers all point at `base_url` with short model names.
pub fn config_for_mock(base_url: &str) -> UpkeepConfig {
    let mut config = UpkeepConfig::default();
    config.providers.ollama.url = base_url.to_string();
    config.providers.huggingface.base_url = base_url.to_string();
    config.providers.huggingface.caption_model = "blip".to_string();
    config.providers.huggingface.summarize_model = "bart".to_string();
    config.providers.huggingface.urgency_model = "mistral".to_string();
    config.providers.huggingface.similarity_model = "minilm".to_string();
    config.providers.openai.base_url = base_url.to_string();
    config
}

pub fn test_credentials() -> Credentials {
    Credentials {
        huggingface_token: Some("hf_test".to_string()),
        openai_api_key: Some("sk-test".to_string()),
    }
}
