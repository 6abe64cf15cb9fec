//! # Keyword Classifier
//!
//! Scores free text against fixed per-locale keyword tables and derives a
//! maintenance relevance verdict. Pure and synchronous: no I/O, no shared
//! state, identical output for identical input.
//!
//! ## Scoring
//!
//! `score = components + 2 × problems + 3 × severity + locations`, each term
//! counting distinct matched keywords.
//!
//! | Condition | Confidence | Risk | Priority |
//! |---|---|---|---|
//! | `score >= 8` or weighted severity `>= 3` | high | high | urgent |
//! | `4 <= score < 8` | medium | medium | medium |
//! | otherwise | low | low | low |
//!
//! ## Example
//!
//! ```
//! use upkeep::classifier::{classify, ConfidenceLevel};
//!
//! let result = classify("cracked pipe under the sink, severe leak");
//! assert_eq!(result.score, 10);
//! assert_eq!(result.confidence, ConfidenceLevel::High);
//! assert!(result.is_maintenance_related);
//! ```

pub mod keywords;
pub mod summary;

pub use keywords::{Category, KeywordTables, Locale};
pub use summary::contextual_summary;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COMPONENT_WEIGHT: u32 = 1;
pub const PROBLEM_WEIGHT: u32 = 2;
pub const SEVERITY_WEIGHT: u32 = 3;
pub const LOCATION_WEIGHT: u32 = 1;

/// Total score at or above which a text is rated high.
pub const HIGH_SCORE_THRESHOLD: u32 = 8;
/// Total score at or above which a text is rated medium.
pub const MEDIUM_SCORE_THRESHOLD: u32 = 4;
/// Weighted severity score at or above which a text is rated high.
pub const HIGH_SEVERITY_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenancePriority {
    Low,
    Medium,
    Urgent,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl MaintenancePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenancePriority::Low => "low",
            MaintenancePriority::Medium => "medium",
            MaintenancePriority::Urgent => "urgent",
        }
    }
}

/// Keyword analysis of a single text.
///
/// Every derived field (score, levels, summary, relevance) is a function of
/// the matched lists and the locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub locale: Locale,
    /// Matched component keywords across the structural, plumbing,
    /// electrical and openings tables, in table order.
    pub components: Vec<String>,
    pub problems: Vec<String>,
    pub severity_indicators: Vec<String>,
    pub locations: Vec<String>,
    /// Non-empty categories with their matched keywords.
    pub details: BTreeMap<Category, Vec<String>>,
    pub score: u32,
    pub confidence: ConfidenceLevel,
    pub risk_level: RiskLevel,
    pub maintenance_priority: MaintenancePriority,
    pub contextual_analysis: String,
    #[serde(rename = "isMaintenanceRelated")]
    pub is_maintenance_related: bool,
}

impl AnalysisResult {
    /// Low-confidence result used when an upload could not be analysed.
    pub fn unavailable(locale: Locale, reason: &str) -> Self {
        Self {
            locale,
            components: Vec::new(),
            problems: Vec::new(),
            severity_indicators: Vec::new(),
            locations: Vec::new(),
            details: BTreeMap::new(),
            score: 0,
            confidence: ConfidenceLevel::Low,
            risk_level: RiskLevel::Low,
            maintenance_priority: MaintenancePriority::Low,
            contextual_analysis: reason.to_string(),
            is_maintenance_related: false,
        }
    }

    /// Weighted severity contribution to the score.
    pub fn severity_score(&self) -> u32 {
        self.severity_indicators.len() as u32 * SEVERITY_WEIGHT
    }
}

/// Classify English text.
pub fn classify(text: &str) -> AnalysisResult {
    classify_with_locale(text, Locale::En)
}

/// Classify text against the keyword tables of `locale`.
pub fn classify_with_locale(text: &str, locale: Locale) -> AnalysisResult {
    let lowered = text.to_lowercase();
    let tables = locale.keywords();

    let mut components: Vec<String> = Vec::new();
    let mut problems = Vec::new();
    let mut severity_indicators = Vec::new();
    let mut locations = Vec::new();
    let mut details = BTreeMap::new();

    for category in Category::ALL {
        let found: Vec<String> = tables
            .category(category)
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect();

        if found.is_empty() {
            continue;
        }

        match category {
            c if c.is_component() => {
                for keyword in &found {
                    if !components.contains(keyword) {
                        components.push(keyword.clone());
                    }
                }
            }
            Category::Problems => problems.extend(found.iter().cloned()),
            Category::SeverityIndicators => severity_indicators.extend(found.iter().cloned()),
            Category::Locations => locations.extend(found.iter().cloned()),
            _ => {}
        }

        details.insert(category, found);
    }

    let severity_score = severity_indicators.len() as u32 * SEVERITY_WEIGHT;
    let score = components.len() as u32 * COMPONENT_WEIGHT
        + problems.len() as u32 * PROBLEM_WEIGHT
        + severity_score
        + locations.len() as u32 * LOCATION_WEIGHT;

    let (confidence, risk_level, maintenance_priority) = grade(score, severity_score);

    let is_maintenance_related = confidence != ConfidenceLevel::Low
        || !problems.is_empty()
        || !severity_indicators.is_empty();

    let mut result = AnalysisResult {
        locale,
        components,
        problems,
        severity_indicators,
        locations,
        details,
        score,
        confidence,
        risk_level,
        maintenance_priority,
        contextual_analysis: String::new(),
        is_maintenance_related,
    };
    result.contextual_analysis = contextual_summary(&result);
    result
}

/// Map a total score and weighted severity score to the three levels.
pub fn grade(score: u32, severity_score: u32) -> (ConfidenceLevel, RiskLevel, MaintenancePriority) {
    if score >= HIGH_SCORE_THRESHOLD || severity_score >= HIGH_SEVERITY_THRESHOLD {
        (
            ConfidenceLevel::High,
            RiskLevel::High,
            MaintenancePriority::Urgent,
        )
    } else if score >= MEDIUM_SCORE_THRESHOLD {
        (
            ConfidenceLevel::Medium,
            RiskLevel::Medium,
            MaintenancePriority::Medium,
        )
    } else {
        (ConfidenceLevel::Low, RiskLevel::Low, MaintenancePriority::Low)
    }
}
