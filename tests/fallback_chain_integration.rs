//! End-to-end fallback behaviour against mocked providers.
//!
//! Every provider points at one wiremock server; each test mounts the
//! responses that drive a chain to a particular strategy.

mod common;

use common::{
    app_with, config_for_mock, json_request, multipart_request, read_json, test_credentials,
    FilePart,
};
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_caption_falls_back_from_ollama_to_huggingface() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/blip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "there is a leaking pipe under the kitchen sink"}
        ])))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(multipart_request(
            "/analyze-image",
            &[FilePart::png("file", "sink.png", 64, 64)],
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["strategy"], "huggingface-blip");
    assert_eq!(json["description"], "Leaking pipe under the kitchen sink.");
    assert_eq!(json["isMaintenanceRelated"], true);
}

#[tokio::test]
async fn test_caption_accepts_local_vision_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "a cracked window frame with water stains on the wall",
            "done": true
        })))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(multipart_request(
            "/analyze-image",
            &[FilePart::png("file", "window.png", 64, 64)],
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["strategy"], "ollama-vision");
    assert_eq!(
        json["description"],
        "A cracked window frame with water stains on the wall."
    );
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "too late", "done": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/blip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "a broken door handle on a wooden door"}
        ])))
        .mount(&mock_server)
        .await;

    let mut config = config_for_mock(&mock_server.uri());
    config.providers.ollama.timeout_seconds = 1;
    let app = app_with(config, test_credentials());

    let response = app
        .oneshot(multipart_request(
            "/analyze-image",
            &[FilePart::png("file", "door.png", 64, 64)],
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["strategy"], "huggingface-blip");
}

#[tokio::test]
async fn test_request_confirmed_by_similarity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/minilm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.9])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/mistral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": " 3"}
        ])))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(json_request(
            "/analyze-request",
            json!({
                "userText": "The sink leaks",
                "imageDescriptions": ["Water pooling under a kitchen sink."]
            }),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(
        json["summary"],
        "The sink leaks (Confirmed by AI image analysis)"
    );
    assert_eq!(json["strategy"], "huggingface-similarity");
    assert_eq!(json["urgencyLevel"], 3);
    assert_eq!(json["urgencyStrategy"], "huggingface-urgency");
}

#[tokio::test]
async fn test_request_low_similarity_adds_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/minilm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.1])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/mistral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "4"}
        ])))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(json_request(
            "/analyze-request",
            json!({
                "userText": "Noise",
                "imageDescriptions": ["Exposed electrical wires hanging from the ceiling."]
            }),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(
        json["summary"],
        "Tenant reported: \"Noise\". AI analysis identified additional details: \
         Exposed electrical wires hanging from the ceiling."
    );
    assert_eq!(json["urgencyLevel"], 4);
}

#[tokio::test]
async fn test_urgency_falls_back_to_openai() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/mistral"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "2"}}]
        })))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(json_request(
            "/analyze-request",
            json!({"userText": "Gas leak by the stove"}),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    // One-sided input skips the similarity strategy
    assert_eq!(json["strategy"], "merge-rule");
    assert_eq!(json["urgencyLevel"], 2);
    assert_eq!(json["urgencyStrategy"], "openai-urgency");
}

#[tokio::test]
async fn test_unparseable_urgency_reply_is_declined() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/mistral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "It depends on the situation."}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Level 1"}}]
        })))
        .mount(&mock_server)
        .await;

    let app = app_with(config_for_mock(&mock_server.uri()), test_credentials());
    let response = app
        .oneshot(json_request(
            "/analyze-request",
            json!({"userText": "Paint scratch on the hallway wall"}),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["urgencyLevel"], 1);
    assert_eq!(json["urgencyStrategy"], "openai-urgency");
}

#[tokio::test]
async fn test_all_providers_failing_uses_rules() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = config_for_mock(&mock_server.uri());

    let response = app_with(config.clone(), test_credentials())
        .oneshot(multipart_request(
            "/analyze-image?expand=true",
            &[FilePart::png("file", "wall.png", 64, 64)],
        ))
        .await
        .unwrap();
    let json = read_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["strategy"], "caption-rule");
    assert!(json["expandedDescription"].is_string());

    let response = app_with(config.clone(), test_credentials())
        .oneshot(json_request(
            "/analyze-request",
            json!({
                "userText": "Toilet overflowing",
                "imageDescriptions": ["Water on the bathroom floor."]
            }),
        ))
        .await
        .unwrap();
    let json = read_json(response).await;
    assert_eq!(json["strategy"], "merge-rule");
    assert_eq!(json["summary"], "Toilet overflowing. Water on the bathroom floor.");
    assert_eq!(json["urgencyStrategy"], "urgency-rule");
    assert_eq!(json["urgencyLevel"], 3);

    let response = app_with(config, test_credentials())
        .oneshot(json_request(
            "/summarize",
            json!({"text": "The heater is broken. It is cold. The landlord was told."}),
        ))
        .await
        .unwrap();
    let json = read_json(response).await;
    assert_eq!(json["strategy"], "summarize-rule");
    assert_eq!(json["summary"], "The heater is broken. It is cold.");
}

#[tokio::test]
async fn test_missing_credentials_skip_hosted_providers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "4"}])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = config_for_mock(&mock_server.uri());
    config.providers.ollama.enabled = false;
    let app = app_with(config, upkeep::registry::Credentials::default());

    let response = app
        .oneshot(json_request(
            "/analyze-request",
            json!({"userText": "Door sticking a little"}),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["urgencyStrategy"], "urgency-rule");
    assert_eq!(json["urgencyLevel"], 2);
}
