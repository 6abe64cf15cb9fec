//! Strategy Registry module.
//!
//! Builds one [`FallbackChain`] per task from configuration, once at
//! startup. Handlers borrow the chains through shared application state;
//! nothing here is mutated after construction.
//!
//! A provider joins the chains only when it is enabled and, for hosted
//! providers, its credential environment variable is set.
//!
//! # Examples
//!
//! ```
//! use upkeep::config::AnalysisConfig;
//! use upkeep::registry::StrategyRegistry;
//!
//! let registry = StrategyRegistry::rule_based(&AnalysisConfig::default());
//! assert_eq!(registry.urgency.strategy_names(), vec!["urgency-rule"]);
//! ```


use crate::config::{AnalysisConfig, ProvidersConfig, UpkeepConfig};
use crate::orchestrator::{FallbackChain, StrategyDescriptor, StrategyKind, Task};
use crate::provider::{HuggingFaceClient, OllamaClient, OpenAiClient};
use crate::strategy::caption::{
    CaptionRule, HuggingFaceCaptionStrategy, OllamaCaptionStrategy,
};
use crate::strategy::merge::{MergeRule, SimilarityMergeStrategy};
use crate::strategy::text::{
    expand_prompt, summarize_prompt, translate_prompt, ExpandRule, HuggingFaceSummarizeStrategy,
    LlmTextStrategy, SummarizeRule, TranslateRule,
};
use crate::strategy::urgency::{LlmUrgencyStrategy, UrgencyRule};
use crate::strategy::{CaptionInput, MergeInput, TextBackend, TextInput, TranslateInput};
use crate::urgency::UrgencyLevel;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TEXT_MAX_TOKENS: u32 = 300;

/// Provider secrets resolved at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub huggingface_token: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Read the environment variables named in the provider sections.
    pub fn from_env(providers: &ProvidersConfig) -> Self {
        Self {
            huggingface_token: providers.huggingface.token(),
            openai_api_key: providers.openai.api_key(),
        }
    }
}

/// One fallback chain per task.
pub struct StrategyRegistry {
    pub caption: FallbackChain<CaptionInput, String>,
    pub expand: FallbackChain<TextInput, String>,
    pub summarize: FallbackChain<TextInput, String>,
    pub translate: FallbackChain<TranslateInput, String>,
    pub urgency: FallbackChain<TextInput, UrgencyLevel>,
    pub merge: FallbackChain<MergeInput, String>,
}

/// Serializable view of one chain, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSummary {
    pub task: Task,
    pub strategies: Vec<StrategySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub name: String,
    pub kind: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[allow(clippy::ptr_arg)]
fn non_blank<I>(_: &I, text: &String) -> bool {
    !text.trim().is_empty()
}

fn descriptor(name: &str, kind: StrategyKind, priority: u32, timeout: Duration) -> StrategyDescriptor {
    StrategyDescriptor::new(name, kind)
        .with_priority(priority)
        .with_timeout(timeout)
}

fn summarize_chain<I, O>(chain: &FallbackChain<I, O>) -> ChainSummary
where
    I: crate::orchestrator::TaskInput + Send + Sync + 'static,
    O: Send + 'static,
{
    let mut strategies: Vec<StrategySummary> = chain
        .descriptors()
        .map(|d| StrategySummary {
            name: d.name.clone(),
            kind: d.kind.clone(),
            priority: Some(d.priority),
            timeout_ms: Some(d.timeout.as_millis() as u64),
        })
        .collect();
    strategies.push(StrategySummary {
        name: chain.terminal_name().to_string(),
        kind: StrategyKind::RuleBased,
        priority: None,
        timeout_ms: None,
    });

    ChainSummary {
        task: chain.task(),
        strategies,
    }
}

impl StrategyRegistry {
    /// Chains holding only their rule-based strategies.
    pub fn rule_based(analysis: &AnalysisConfig) -> Self {
        let min_chars = analysis.min_caption_chars;

        Self {
            caption: FallbackChain::new(Task::Caption, CaptionRule).with_acceptance(
                move |_: &CaptionInput, caption: &String| caption.trim().chars().count() >= min_chars,
            ),
            expand: FallbackChain::new(Task::Expand, ExpandRule).with_acceptance(non_blank),
            summarize: FallbackChain::new(
                Task::Summarize,
                SummarizeRule {
                    max_sentences: analysis.summary_max_sentences,
                    max_words: analysis.summary_max_words,
                },
            )
            .with_acceptance(non_blank),
            translate: FallbackChain::new(Task::Translate, TranslateRule).with_acceptance(non_blank),
            urgency: FallbackChain::new(Task::ClassifyUrgency, UrgencyRule),
            merge: FallbackChain::new(Task::Merge, MergeRule).with_acceptance(non_blank),
        }
    }

    /// Build every chain from config, reading credentials from the environment.
    pub fn from_config(config: &UpkeepConfig, client: Arc<Client>) -> Self {
        let credentials = Credentials::from_env(&config.providers);
        Self::with_credentials(config, client, credentials)
    }

    /// Build every chain from config with explicit credentials.
    pub fn with_credentials(
        config: &UpkeepConfig,
        client: Arc<Client>,
        credentials: Credentials,
    ) -> Self {
        let mut registry = Self::rule_based(&config.analysis);
        let providers = &config.providers;

        let ollama = &providers.ollama;
        if ollama.enabled {
            let ollama_client = OllamaClient::new(&ollama.url, Arc::clone(&client), ollama.timeout());
            let text_backend = TextBackend::Ollama {
                client: ollama_client.clone(),
                model: ollama.text_model.clone(),
            };

            registry.caption.push(Arc::new(OllamaCaptionStrategy::new(
                descriptor("ollama-vision", StrategyKind::LocalModel, ollama.priority, ollama.timeout()),
                ollama_client,
                ollama.vision_model.clone(),
                config.analysis.min_caption_chars,
            )));
            registry.expand.push(Arc::new(LlmTextStrategy::<TextInput>::new(
                descriptor("ollama-expand", StrategyKind::LocalModel, ollama.priority, ollama.timeout()),
                text_backend.clone(),
                expand_prompt,
                TEXT_MAX_TOKENS,
            )));
            registry.translate.push(Arc::new(LlmTextStrategy::<TranslateInput>::new(
                descriptor("ollama-translate", StrategyKind::LocalModel, ollama.priority, ollama.timeout()),
                text_backend,
                translate_prompt,
                TEXT_MAX_TOKENS,
            )));
            info!(url = %ollama.url, vision_model = %ollama.vision_model, "Ollama strategies enabled");
        }

        let hf = &providers.huggingface;
        match (hf.enabled, credentials.huggingface_token) {
            (true, Some(token)) => {
                let kind = StrategyKind::Provider("huggingface".to_string());
                let hf_client = HuggingFaceClient::new(&hf.base_url, token, Arc::clone(&client), hf.timeout());

                registry.caption.push(Arc::new(HuggingFaceCaptionStrategy::new(
                    descriptor("huggingface-blip", kind.clone(), hf.priority, hf.timeout()),
                    hf_client.clone(),
                    hf.caption_model.clone(),
                )));
                registry.summarize.push(Arc::new(HuggingFaceSummarizeStrategy::new(
                    descriptor("huggingface-summarize", kind.clone(), hf.priority, hf.timeout()),
                    hf_client.clone(),
                    hf.summarize_model.clone(),
                )));
                registry.urgency.push(Arc::new(LlmUrgencyStrategy::new(
                    descriptor("huggingface-urgency", kind.clone(), hf.priority, hf.timeout()),
                    TextBackend::HuggingFace {
                        client: hf_client.clone(),
                        model: hf.urgency_model.clone(),
                    },
                )));
                registry.merge.push(Arc::new(SimilarityMergeStrategy::new(
                    descriptor("huggingface-similarity", kind, hf.priority, hf.similarity_timeout()),
                    hf_client.with_timeout(hf.similarity_timeout()),
                    hf.similarity_model.clone(),
                )));
                info!("Hugging Face strategies enabled");
            }
            (true, None) => {
                warn!(env = %hf.token_env, "Hugging Face token not set, provider strategies disabled");
            }
            (false, _) => {}
        }

        let openai = &providers.openai;
        match (openai.enabled, credentials.openai_api_key) {
            (true, Some(api_key)) => {
                let kind = StrategyKind::Provider("openai".to_string());
                let backend = TextBackend::OpenAi {
                    client: OpenAiClient::new(&openai.base_url, api_key, Arc::clone(&client), openai.timeout()),
                    model: openai.model.clone(),
                };

                registry.expand.push(Arc::new(LlmTextStrategy::<TextInput>::new(
                    descriptor("openai-expand", kind.clone(), openai.priority, openai.timeout()),
                    backend.clone(),
                    expand_prompt,
                    TEXT_MAX_TOKENS,
                )));
                registry.summarize.push(Arc::new(LlmTextStrategy::<TextInput>::new(
                    descriptor("openai-summarize", kind.clone(), openai.priority, openai.timeout()),
                    backend.clone(),
                    summarize_prompt,
                    TEXT_MAX_TOKENS,
                )));
                registry.translate.push(Arc::new(LlmTextStrategy::<TranslateInput>::new(
                    descriptor("openai-translate", kind.clone(), openai.priority, openai.timeout()),
                    backend.clone(),
                    translate_prompt,
                    TEXT_MAX_TOKENS,
                )));
                registry.urgency.push(Arc::new(LlmUrgencyStrategy::new(
                    descriptor("openai-urgency", kind, openai.priority, openai.timeout()),
                    backend,
                )));
                info!(model = %openai.model, "OpenAI strategies enabled");
            }
            (true, None) => {
                warn!(env = %openai.api_key_env, "OpenAI API key not set, provider strategies disabled");
            }
            (false, _) => {}
        }

        registry
    }

    /// Every chain in task order.
    pub fn chains(&self) -> Vec<ChainSummary> {
        vec![
            summarize_chain(&self.caption),
            summarize_chain(&self.expand),
            summarize_chain(&self.summarize),
            summarize_chain(&self.translate),
            summarize_chain(&self.urgency),
            summarize_chain(&self.merge),
        ]
    }

    /// Number of non-rule strategies across all chains.
    pub fn external_strategy_count(&self) -> usize {
        self.chains()
            .iter()
            .map(|c| c.strategies.iter().filter(|s| s.kind != StrategyKind::RuleBased).count())
            .sum()
    }
}
