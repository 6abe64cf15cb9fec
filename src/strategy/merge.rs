//! Merging tenant text with photo captions.

use super::MergeInput;
use crate::orchestrator::{RuleStrategy, Strategy, StrategyDescriptor, StrategyError};
use crate::provider::HuggingFaceClient;
use async_trait::async_trait;
use tracing::debug;

/// Below this similarity the captions are treated as new information.
pub const LOW_SIMILARITY: f64 = 0.4;
/// At or above this similarity the captions confirm the tenant's text.
pub const HIGH_SIMILARITY: f64 = 0.6;

pub const DEFAULT_REQUEST_SUMMARY: &str = "Maintenance request";

/// Combine tenant text and captions according to their similarity score.
pub fn merge_with_score(user_text: &str, descriptions: &str, score: f64) -> String {
    if score < LOW_SIMILARITY && descriptions.chars().count() > user_text.chars().count() {
        format!(
            "Tenant reported: \"{}\". AI analysis identified additional details: {}",
            user_text, descriptions
        )
    } else if score >= HIGH_SIMILARITY {
        format!("{} (Confirmed by AI image analysis)", user_text)
    } else {
        format!("{}. AI analysis: {}", user_text, descriptions)
    }
}

/// Scores caption similarity with a sentence-similarity model.
pub struct SimilarityMergeStrategy {
    descriptor: StrategyDescriptor,
    client: HuggingFaceClient,
    model: String,
}

impl SimilarityMergeStrategy {
    pub fn new(descriptor: StrategyDescriptor, client: HuggingFaceClient, model: String) -> Self {
        Self {
            descriptor,
            client,
            model,
        }
    }
}

#[async_trait]
impl Strategy<MergeInput, String> for SimilarityMergeStrategy {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, input: &MergeInput) -> Result<Option<String>, StrategyError> {
        let combined = input.combined_descriptions();
        let scores = self
            .client
            .similarity(&self.model, &input.user_text, std::slice::from_ref(&combined))
            .await?;

        let score = scores.first().copied().unwrap_or(0.0);
        debug!(score, "Caption similarity");
        Ok(Some(merge_with_score(&input.user_text, &combined, score)))
    }
}

/// Plain concatenation, or whichever side is present.
pub struct MergeRule;

impl RuleStrategy<MergeInput, String> for MergeRule {
    fn name(&self) -> &str {
        "merge-rule"
    }

    fn apply(&self, input: &MergeInput) -> String {
        let combined = input.combined_descriptions();
        match (input.user_text.is_empty(), combined.is_empty()) {
            (false, false) => format!("{}. {}", input.user_text, combined),
            (false, true) => input.user_text.clone(),
            (true, false) => combined,
            (true, true) => DEFAULT_REQUEST_SUMMARY.to_string(),
        }
    }
}
