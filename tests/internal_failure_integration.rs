//! A strategy that panics must still yield a JSON answer.

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{app_with_registry, json_request, multipart_request, read_json, FilePart};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use upkeep::config::UpkeepConfig;
use upkeep::orchestrator::{Strategy, StrategyDescriptor, StrategyError, StrategyKind};
use upkeep::registry::StrategyRegistry;
use upkeep::strategy::{CaptionInput, MergeInput};

/// Panics on every attempt.
struct Exploding {
    descriptor: StrategyDescriptor,
}

impl Exploding {
    fn new(name: &str) -> Self {
        Self {
            descriptor: StrategyDescriptor::new(name, StrategyKind::Provider("broken".to_string()))
                .with_priority(1),
        }
    }
}

#[async_trait]
impl Strategy<CaptionInput, String> for Exploding {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, _input: &CaptionInput) -> Result<Option<String>, StrategyError> {
        panic!("caption backend exploded");
    }
}

#[async_trait]
impl Strategy<MergeInput, String> for Exploding {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, _input: &MergeInput) -> Result<Option<String>, StrategyError> {
        panic!("merge backend exploded");
    }
}

fn exploding_app() -> axum::Router {
    let mut config = UpkeepConfig::default();
    config.providers.disable_all();

    let mut registry = StrategyRegistry::rule_based(&config.analysis);
    registry.caption.push(Arc::new(Exploding::new("exploding-caption")));
    registry.merge.push(Arc::new(Exploding::new("exploding-merge")));

    app_with_registry(config, registry)
}

#[tokio::test]
async fn test_image_pipeline_panic_returns_failed_entry() {
    let response = exploding_app()
        .oneshot(multipart_request(
            "/analyze-image",
            &[FilePart::png("file", "ceiling.png", 64, 64)],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["filename"], "ceiling.png");
    assert_eq!(json["isMaintenanceRelated"], false);
    assert_eq!(json["analysis"]["confidence"], "low");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_batch_panic_keeps_other_entries() {
    let response = exploding_app()
        .oneshot(multipart_request(
            "/analyze-multiple-images",
            &[
                FilePart::png("files", "a.png", 64, 64),
                FilePart::png("files", "tiny.png", 10, 10),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["success"], false);
    assert_eq!(results[1]["description"], "Image is too small for analysis");
}

#[tokio::test]
async fn test_request_pipeline_panic_uses_rule_fallback() {
    let response = exploding_app()
        .oneshot(json_request(
            "/analyze-request",
            json!({"userText": "sink leaks", "imageDescriptions": ["Wet floor."]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["fallback"], true);
    assert_eq!(json["summary"], "sink leaks. Wet floor.");
    assert_eq!(json["urgencyLevel"], 3);
    assert!(json.get("strategy").is_none());
}
