//! Caption strategies and caption text rules.

use super::CaptionInput;
use crate::orchestrator::{
    RuleStrategy, Strategy, StrategyDescriptor, StrategyError, StrategyKind,
};
use crate::provider::{GenerationOptions, HuggingFaceClient, OllamaClient};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Phrases that show the model repeated its instructions.
pub const INSTRUCTION_ECHOES: &[&str] = &[
    "analyze this",
    "describe",
    "examine this",
    "inspect this",
    "focus on",
    "specific components",
    "visible damage",
    "safety issues",
    "maintenance issues",
    "what you see",
    "this image",
];

/// Words suggesting the caption describes something concrete.
pub const DESCRIPTIVE_INDICATORS: &[&str] = &[
    "broken", "cracked", "damaged", "leaking", "stained", "corroded", "rusted", "mold", "hole",
    "exposed", "loose", "worn", "faulty", "missing", "bent", "sagging", "pipe", "wall", "floor",
    "door", "window", "water", "electrical", "wood", "metal", "plastic",
];

/// Lead-ins stripped from captions.
pub const FILLER_PHRASES: &[&str] = &[
    "this is a picture of",
    "there is a",
    "this image shows",
    "this is an image of",
    "you can see",
    "in this photo",
    "the image shows",
    "we can see",
];

pub const UNANALYZABLE_DESCRIPTION: &str = "Unable to analyze image content";

/// Word count at which a caption is accepted without indicator matches.
const MIN_DESCRIPTIVE_WORDS: usize = 8;
const MIN_INDICATOR_MATCHES: usize = 2;

/// Whether `description` is a usable caption for a request made with `prompt`.
///
/// Rejects short text, text echoing any prompt word longer than four
/// characters, and text echoing common instruction phrases. Accepts the
/// rest if it names at least two concrete things or runs to eight words.
pub fn is_valid_description(description: &str, prompt: &str, min_chars: usize) -> bool {
    if description.trim().chars().count() < min_chars {
        return false;
    }

    let lowered = description.to_lowercase();
    let prompt = prompt.to_lowercase();

    if prompt
        .split_whitespace()
        .filter(|word| word.chars().count() > 4)
        .any(|word| lowered.contains(word))
    {
        return false;
    }

    if INSTRUCTION_ECHOES.iter().any(|echo| lowered.contains(echo)) {
        return false;
    }

    let indicators = DESCRIPTIVE_INDICATORS
        .iter()
        .filter(|word| lowered.contains(*word))
        .count();

    indicators >= MIN_INDICATOR_MATCHES || description.split_whitespace().count() >= MIN_DESCRIPTIVE_WORDS
}

/// Strip filler lead-ins, capitalize and terminate with punctuation.
pub fn enhance_description(description: &str) -> String {
    let mut text = description.trim().to_string();
    for phrase in FILLER_PHRASES {
        text = text.replace(phrase, "").trim().to_string();
    }

    if text.is_empty() {
        return UNANALYZABLE_DESCRIPTION.to_string();
    }

    let mut chars = text.chars();
    let mut enhanced: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    if !enhanced.ends_with(['.', '!', '?']) {
        enhanced.push('.');
    }
    enhanced
}

/// One prompt variant for the local vision model.
#[derive(Debug, Clone, Copy)]
pub struct CaptionPrompt {
    /// Text sent to the model.
    pub instruction: &'static str,
    /// Words the caption must not echo back.
    pub echo_guard: &'static str,
    pub options: GenerationOptions,
}

/// Variants tried in order until one yields a valid caption.
pub const CAPTION_PROMPTS: [CaptionPrompt; 3] = [
    CaptionPrompt {
        instruction: "Caption this photo in one plain sentence.",
        echo_guard: "",
        options: GenerationOptions {
            num_predict: 100,
            temperature: 0.7,
        },
    },
    CaptionPrompt {
        instruction: "maintenance issues damage repair",
        echo_guard: "maintenance issues damage repair",
        options: GenerationOptions {
            num_predict: 120,
            temperature: 0.8,
        },
    },
    CaptionPrompt {
        instruction: "describe what is visible",
        echo_guard: "describe what is visible",
        options: GenerationOptions {
            num_predict: 80,
            temperature: 0.6,
        },
    },
];

/// Captions with a local Ollama vision model, trying each prompt variant.
pub struct OllamaCaptionStrategy {
    descriptor: StrategyDescriptor,
    client: OllamaClient,
    model: String,
    min_chars: usize,
}

impl OllamaCaptionStrategy {
    pub fn new(descriptor: StrategyDescriptor, client: OllamaClient, model: String, min_chars: usize) -> Self {
        Self {
            descriptor: descriptor.declinable(),
            client,
            model,
            min_chars,
        }
    }
}

#[async_trait]
impl Strategy<CaptionInput, String> for OllamaCaptionStrategy {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &CaptionInput) -> Result<Option<String>, StrategyError> {
        let mut last_error = None;
        let mut produced_any = false;

        for (i, prompt) in CAPTION_PROMPTS.iter().enumerate() {
            match self
                .client
                .generate(&self.model, prompt.instruction, Some(&input.bytes[..]), prompt.options)
                .await
            {
                Ok(caption) => {
                    produced_any = true;
                    if is_valid_description(&caption, prompt.echo_guard, self.min_chars) {
                        debug!(variant = i + 1, filename = %input.filename, "Caption variant accepted");
                        return Ok(Some(enhance_description(&caption)));
                    }
                    debug!(variant = i + 1, filename = %input.filename, "Caption variant produced invalid description");
                }
                Err(e) => {
                    warn!(variant = i + 1, error = %e, "Caption variant failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !produced_any => Err(e.into()),
            _ => Ok(None),
        }
    }
}

/// Captions via a hosted image-captioning model.
pub struct HuggingFaceCaptionStrategy {
    descriptor: StrategyDescriptor,
    client: HuggingFaceClient,
    model: String,
}

impl HuggingFaceCaptionStrategy {
    pub fn new(descriptor: StrategyDescriptor, client: HuggingFaceClient, model: String) -> Self {
        Self {
            descriptor,
            client,
            model,
        }
    }
}

#[async_trait]
impl Strategy<CaptionInput, String> for HuggingFaceCaptionStrategy {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &CaptionInput) -> Result<Option<String>, StrategyError> {
        let caption = self.client.caption(&self.model, &input.bytes).await?;
        if caption.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(enhance_description(&caption)))
    }
}

/// Fixed caption naming the photo dimensions.
pub struct CaptionRule;

pub const CAPTION_RULE_NAME: &str = "caption-rule";

impl RuleStrategy<CaptionInput, String> for CaptionRule {
    fn name(&self) -> &str {
        CAPTION_RULE_NAME
    }

    fn apply(&self, input: &CaptionInput) -> String {
        if input.width > 0 && input.height > 0 {
            format!(
                "Photo ({}x{}) submitted for maintenance review; no automated description available.",
                input.width, input.height
            )
        } else {
            "Photo submitted for maintenance review; no automated description available.".to_string()
        }
    }
}

/// Descriptor for the local vision strategy.
pub fn ollama_descriptor(priority: u32, timeout: std::time::Duration) -> StrategyDescriptor {
    StrategyDescriptor::new("ollama-vision", StrategyKind::LocalModel)
        .with_priority(priority)
        .with_timeout(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Client;
    use std::sync::Arc;
    use std::time::Duration;

    fn image(width: u32, height: u32) -> CaptionInput {
        CaptionInput {
            filename: "leak.png".to_string(),
            bytes: Arc::from(&b"png"[..]),
            width,
            height,
        }
    }

    #[test]
    fn test_valid_description_with_indicators() {
        assert!(is_valid_description("a leaking pipe under a sink", "", 10));
    }

    #[test]
    fn test_valid_description_by_length() {
        assert!(is_valid_description(
            "a small grey cat sleeping on a soft blue sofa",
            "",
            10
        ));
    }

    #[test]
    fn test_short_description_rejected() {
        assert!(!is_valid_description("pipe wall", "", 10));
        assert!(!is_valid_description("", "", 10));
    }

    #[test]
    fn test_prompt_echo_rejected() {
        assert!(!is_valid_description(
            "repair the broken pipe on the wall",
            "maintenance issues damage repair",
            10
        ));
        // Short prompt words are not echo candidates
        assert!(is_valid_description(
            "what a broken pipe on the wall",
            "describe what is visible",
            10
        ));
    }

    #[test]
    fn test_instruction_echo_rejected() {
        assert!(!is_valid_description(
            "this image shows a broken pipe near the wall",
            "",
            10
        ));
        assert!(!is_valid_description("Focus on the cracked wall", "", 10));
    }

    #[test]
    fn test_few_words_without_indicators_rejected() {
        assert!(!is_valid_description("a bathroom with a toilet", "", 10));
    }

    #[test]
    fn test_enhance_description() {
        assert_eq!(
            enhance_description("there is a broken window in the kitchen"),
            "Broken window in the kitchen."
        );
        assert_eq!(enhance_description("is it leaking?"), "Is it leaking?");
        assert_eq!(enhance_description(""), UNANALYZABLE_DESCRIPTION);
        assert_eq!(enhance_description("we can see"), UNANALYZABLE_DESCRIPTION);
    }

    #[test]
    fn test_enhance_is_case_sensitive_for_fillers() {
        assert_eq!(
            enhance_description("There is a crack"),
            "There is a crack."
        );
    }

    #[test]
    fn test_caption_rule_mentions_dimensions() {
        assert_eq!(
            CaptionRule.apply(&image(640, 480)),
            "Photo (640x480) submitted for maintenance review; no automated description available."
        );
        assert!(CaptionRule.apply(&image(0, 0)).starts_with("Photo submitted"));
    }

    #[tokio::test]
    async fn test_ollama_caption_falls_through_variants() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "prompt": CAPTION_PROMPTS[0].instruction
            })))
            .with_status(200)
            .with_body(r#"{"response":"a photo"}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "prompt": CAPTION_PROMPTS[1].instruction
            })))
            .with_status(200)
            .with_body(r#"{"response":"there is a rusted pipe leaking onto the floor"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), Arc::new(Client::new()), Duration::from_secs(5));
        let strategy = OllamaCaptionStrategy::new(
            ollama_descriptor(10, Duration::from_secs(5)),
            client,
            "llava".to_string(),
            10,
        );

        let caption = strategy.attempt(&image(100, 100)).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(caption.as_deref(), Some("Rusted pipe leaking onto the floor."));
    }

    #[tokio::test]
    async fn test_ollama_caption_unreachable_is_error() {
        let client = OllamaClient::new("http://127.0.0.1:1", Arc::new(Client::new()), Duration::from_secs(2));
        let strategy = OllamaCaptionStrategy::new(
            ollama_descriptor(10, Duration::from_secs(5)),
            client,
            "llava".to_string(),
            10,
        );

        assert!(strategy.attempt(&image(100, 100)).await.is_err());
    }

    #[tokio::test]
    async fn test_huggingface_caption_enhances_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/blip")
            .with_status(200)
            .with_body(r#"[{"generated_text":"a cracked tile floor"}]"#)
            .create_async()
            .await;

        let client = HuggingFaceClient::new(
            &server.url(),
            "hf_test".to_string(),
            Arc::new(Client::new()),
            Duration::from_secs(5),
        );
        let strategy = HuggingFaceCaptionStrategy::new(
            StrategyDescriptor::new("huggingface-blip", StrategyKind::Provider("huggingface".into())),
            client,
            "blip".to_string(),
        );

        let caption = strategy.attempt(&image(100, 100)).await.unwrap();
        assert_eq!(caption.as_deref(), Some("A cracked tile floor."));
    }
}
