//! Task strategies.
//!
//! Adapters between the provider clients and the fallback chains: each
//! strategy builds a prompt for its task, calls one provider and validates
//! the reply. Every task also has a rule-based terminal strategy here.

pub mod caption;
pub mod merge;
pub mod text;
pub mod urgency;

use crate::classifier::Locale;
use crate::orchestrator::{StrategyKind, TaskInput};
use crate::provider::{
    ChatMessage, GenerationOptions, HuggingFaceClient, OllamaClient, OpenAiClient, ProviderError,
};
use std::sync::Arc;

/// A decoded, validated image upload.
#[derive(Debug, Clone)]
pub struct CaptionInput {
    pub filename: String,
    pub bytes: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

impl TaskInput for CaptionInput {
    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Free text in a known locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    pub locale: Locale,
}

impl TextInput {
    pub fn new(text: impl Into<String>, locale: Locale) -> Self {
        Self {
            text: text.into(),
            locale,
        }
    }
}

impl TaskInput for TextInput {
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateInput {
    pub text: String,
    pub source: Locale,
    pub target: Locale,
}

impl TaskInput for TranslateInput {
    /// Nothing to translate when the text is blank or already in the target locale.
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty() || self.source == self.target
    }
}

/// Tenant text plus the captions of the attached photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInput {
    pub user_text: String,
    pub image_descriptions: Vec<String>,
}

impl MergeInput {
    pub fn new(user_text: impl Into<String>, image_descriptions: Vec<String>) -> Self {
        Self {
            user_text: user_text.into().trim().to_string(),
            image_descriptions: image_descriptions
                .into_iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn combined_descriptions(&self) -> String {
        self.image_descriptions.join(" ")
    }

    pub fn has_content(&self) -> bool {
        !self.user_text.is_empty() || !self.image_descriptions.is_empty()
    }
}

impl TaskInput for MergeInput {
    /// Merging needs both sides; one-sided input goes straight to the rule.
    fn is_empty(&self) -> bool {
        self.user_text.is_empty() || self.image_descriptions.is_empty()
    }
}

/// Instruction pair for chat-style models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Single-string form for completion-style models.
    pub fn flatten(&self) -> String {
        if self.system.is_empty() {
            self.user.clone()
        } else {
            format!("{}\n\n{}", self.system, self.user)
        }
    }
}

/// A text-generation backend usable by any text task.
#[derive(Clone)]
pub enum TextBackend {
    Ollama { client: OllamaClient, model: String },
    OpenAi { client: OpenAiClient, model: String },
    HuggingFace { client: HuggingFaceClient, model: String },
}

impl TextBackend {
    /// Short provider tag used in strategy names.
    pub fn provider_name(&self) -> &'static str {
        match self {
            TextBackend::Ollama { .. } => "ollama",
            TextBackend::OpenAi { .. } => "openai",
            TextBackend::HuggingFace { .. } => "huggingface",
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            TextBackend::Ollama { .. } => StrategyKind::LocalModel,
            other => StrategyKind::Provider(other.provider_name().to_string()),
        }
    }

    pub async fn complete(
        &self,
        prompt: &ChatPrompt,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        match self {
            TextBackend::Ollama { client, model } => {
                let options = GenerationOptions {
                    num_predict: max_tokens,
                    temperature,
                };
                client.generate(model, &prompt.flatten(), None, options).await
            }
            TextBackend::OpenAi { client, model } => {
                let messages = [
                    ChatMessage::system(prompt.system.clone()),
                    ChatMessage::user(prompt.user.clone()),
                ];
                client.chat(model, &messages, max_tokens, temperature).await
            }
            TextBackend::HuggingFace { client, model } => {
                client.generate(model, &prompt.flatten(), max_tokens).await
            }
        }
    }
}

/// Trim whitespace and wrapping quotes from a model reply.
pub fn clean_reply(reply: &str) -> String {
    let trimmed = reply.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
