//! Text strategies: expand, summarize and translate.

use super::caption::enhance_description;
use super::{clean_reply, ChatPrompt, TextBackend, TextInput, TranslateInput};
use crate::orchestrator::{RuleStrategy, Strategy, StrategyDescriptor, StrategyError};
use crate::provider::HuggingFaceClient;
use async_trait::async_trait;

/// Builds the prompt for one input.
pub type PromptBuilder<I> = fn(&I) -> ChatPrompt;

/// Any text task answered by a chat or completion model.
pub struct LlmTextStrategy<I> {
    descriptor: StrategyDescriptor,
    backend: TextBackend,
    build_prompt: PromptBuilder<I>,
    max_tokens: u32,
    temperature: f32,
}

impl<I> LlmTextStrategy<I> {
    pub fn new(
        descriptor: StrategyDescriptor,
        backend: TextBackend,
        build_prompt: PromptBuilder<I>,
        max_tokens: u32,
    ) -> Self {
        Self {
            descriptor,
            backend,
            build_prompt,
            max_tokens,
            temperature: 0.3,
        }
    }
}

#[async_trait]
impl<I: Send + Sync + 'static> Strategy<I, String> for LlmTextStrategy<I> {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &I) -> Result<Option<String>, StrategyError> {
        let prompt = (self.build_prompt)(input);
        let reply = self
            .backend
            .complete(&prompt, self.max_tokens, self.temperature)
            .await?;
        let cleaned = clean_reply(&reply);
        Ok((!cleaned.is_empty()).then_some(cleaned))
    }
}

/// Abstractive summary from a hosted summarization model.
pub struct HuggingFaceSummarizeStrategy {
    descriptor: StrategyDescriptor,
    client: HuggingFaceClient,
    model: String,
}

impl HuggingFaceSummarizeStrategy {
    pub fn new(descriptor: StrategyDescriptor, client: HuggingFaceClient, model: String) -> Self {
        Self {
            descriptor,
            client,
            model,
        }
    }
}

#[async_trait]
impl Strategy<TextInput, String> for HuggingFaceSummarizeStrategy {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &TextInput) -> Result<Option<String>, StrategyError> {
        let summary = self.client.summarize(&self.model, &input.text).await?;
        let cleaned = clean_reply(&summary);
        Ok((!cleaned.is_empty()).then_some(cleaned))
    }
}

pub fn expand_prompt(input: &TextInput) -> ChatPrompt {
    ChatPrompt::new(
        format!(
            "You write property maintenance notes. Expand the photo caption into two or three \
             factual sentences a maintenance technician can act on. Mention only what the caption \
             states. Reply in {} with the note only.",
            input.locale.language_name()
        ),
        input.text.clone(),
    )
}

pub fn summarize_prompt(input: &TextInput) -> ChatPrompt {
    ChatPrompt::new(
        format!(
            "Summarize this rental maintenance request in at most two sentences. Keep locations, \
             affected components and hazards. Reply in {} with the summary only.",
            input.locale.language_name()
        ),
        input.text.clone(),
    )
}

pub fn translate_prompt(input: &TranslateInput) -> ChatPrompt {
    ChatPrompt::new(
        format!(
            "Translate the user's text from {} to {}. Keep technical terms accurate. \
             Reply with the translation only.",
            input.source.language_name(),
            input.target.language_name()
        ),
        input.text.clone(),
    )
}

/// Caption cleanup without a model.
pub struct ExpandRule;

impl RuleStrategy<TextInput, String> for ExpandRule {
    fn name(&self) -> &str {
        "expand-rule"
    }

    fn apply(&self, input: &TextInput) -> String {
        enhance_description(&input.text)
    }
}

/// Leading sentences of the text, capped in words.
pub struct SummarizeRule {
    pub max_sentences: usize,
    pub max_words: usize,
}

impl RuleStrategy<TextInput, String> for SummarizeRule {
    fn name(&self) -> &str {
        "summarize-rule"
    }

    fn apply(&self, input: &TextInput) -> String {
        extractive_summary(&input.text, self.max_sentences, self.max_words)
    }
}

/// Returns the source text untranslated.
pub struct TranslateRule;

impl RuleStrategy<TranslateInput, String> for TranslateRule {
    fn name(&self) -> &str {
        "translate-rule"
    }

    fn apply(&self, input: &TranslateInput) -> String {
        input.text.trim().to_string()
    }
}

/// Split off up to `max` leading sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text, so decimals like "2.5" stay intact.
pub fn leading_sentences(text: &str, max: usize) -> Vec<&str> {
    let mut sentences = Vec::new();
    if max == 0 {
        return sentences;
    }

    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if !at_boundary {
            continue;
        }

        let end = i + c.len_utf8();
        let sentence = text[start..end].trim();
        start = end;
        if !sentence.is_empty() {
            sentences.push(sentence);
            if sentences.len() == max {
                return sentences;
            }
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// First `max_sentences` sentences, truncated to `max_words` words.
pub fn extractive_summary(text: &str, max_sentences: usize, max_words: usize) -> String {
    let joined = leading_sentences(text, max_sentences).join(" ");
    let words: Vec<&str> = joined.split_whitespace().collect();

    if words.len() <= max_words {
        return words.join(" ");
    }
    format!("{}...", words[..max_words].join(" "))
}
