//! Urgency classification strategies.

use super::{ChatPrompt, TextBackend, TextInput};
use crate::orchestrator::{RuleStrategy, Strategy, StrategyDescriptor, StrategyError};
use crate::urgency::{classify_urgency_fallback_for, parse_urgency_reply, urgency_prompt, UrgencyLevel};
use async_trait::async_trait;
use tracing::debug;

/// Asks a language model for a 1-4 rating.
///
/// A reply without a standalone digit 1-4 is a decline, not a guess.
pub struct LlmUrgencyStrategy {
    descriptor: StrategyDescriptor,
    backend: TextBackend,
}

impl LlmUrgencyStrategy {
    pub fn new(descriptor: StrategyDescriptor, backend: TextBackend) -> Self {
        Self {
            descriptor: descriptor.declinable(),
            backend,
        }
    }
}

#[async_trait]
impl Strategy<TextInput, UrgencyLevel> for LlmUrgencyStrategy {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &TextInput) -> Result<Option<UrgencyLevel>, StrategyError> {
        let prompt = ChatPrompt::new(String::new(), urgency_prompt(&input.text));
        let reply = self.backend.complete(&prompt, 8, 0.0).await?;
        let level = parse_urgency_reply(&reply);
        if level.is_none() {
            debug!(strategy = %self.descriptor.name, reply_len = reply.len(), "No urgency digit in reply");
        }
        Ok(level)
    }
}

/// Tiered phrase rules in the request locale.
pub struct UrgencyRule;

impl RuleStrategy<TextInput, UrgencyLevel> for UrgencyRule {
    fn name(&self) -> &str {
        "urgency-rule"
    }

    fn apply(&self, input: &TextInput) -> UrgencyLevel {
        classify_urgency_fallback_for(&input.text, input.locale)
    }
}
