//! Analysis thresholds and defaults

use crate::classifier::Locale;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Locale used when a request does not name one
    pub default_locale: Locale,
    /// Captions shorter than this (after trimming) are treated as empty
    pub min_caption_chars: usize,
    /// Uploads narrower or shorter than this are rejected
    pub min_image_dimension: u32,
    pub max_images_per_request: usize,
    /// Word cap of the rule-based summary
    pub summary_max_words: usize,
    /// Sentence cap of the rule-based summary
    pub summary_max_sentences: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::En,
            min_caption_chars: 10,
            min_image_dimension: 50,
            max_images_per_request: 10,
            summary_max_words: 60,
            summary_max_sentences: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.min_caption_chars, 10);
        assert_eq!(config.min_image_dimension, 50);
        assert_eq!(config.max_images_per_request, 10);
        assert_eq!(config.summary_max_words, 60);
    }

    #[test]
    fn test_locale_from_toml() {
        let config: AnalysisConfig = toml::from_str(r#"default_locale = "es""#).unwrap();
        assert_eq!(config.default_locale, Locale::Es);
    }
}
