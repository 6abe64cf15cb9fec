//! Urgency levels and the rule-based urgency classifier.
//!
//! Urgency is an integer in `[1, 4]`, 4 being most urgent. The rule
//! classifier checks tiered phrase lists top-down (critical, high, medium)
//! and returns the first tier that matches, defaulting to 2.

use crate::classifier::Locale;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Request urgency, always within `[1, 4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct UrgencyLevel(u8);

impl UrgencyLevel {
    pub const LOW: UrgencyLevel = UrgencyLevel(1);
    pub const MEDIUM: UrgencyLevel = UrgencyLevel(2);
    pub const HIGH: UrgencyLevel = UrgencyLevel(3);
    pub const CRITICAL: UrgencyLevel = UrgencyLevel(4);

    /// Create a level, clamping to `[1, 4]`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, 4) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "low",
            2 => "medium",
            3 => "high",
            _ => "critical",
        }
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl From<i64> for UrgencyLevel {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<UrgencyLevel> for u8 {
    fn from(level: UrgencyLevel) -> Self {
        level.0
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phrase lists for the three rule tiers of a locale.
#[derive(Debug)]
pub struct UrgencyTiers {
    pub critical: &'static [&'static str],
    pub high: &'static [&'static str],
    pub medium: &'static [&'static str],
}

pub static ENGLISH_TIERS: UrgencyTiers = UrgencyTiers {
    critical: &[
        "gas leak",
        "electrical spark",
        "fire hazard",
        "flood",
        "no power",
        "broken window",
        "no lock",
        "no heat",
        "no water",
        "raw sewage",
        "exposed wire",
        "structural collapse",
    ],
    high: &[
        "leak",
        "flooding",
        "electrical",
        "not working",
        "broken",
        "clog",
        "overflow",
        "pest",
        "mold",
        "no hot water",
        "water damage",
        "exposed pipe",
    ],
    medium: &[
        "slow", "drip", "minor", "cosmetic", "paint", "scratch", "loose", "stain", "sticking",
        "noisy",
    ],
};

pub static SPANISH_TIERS: UrgencyTiers = UrgencyTiers {
    critical: &[
        "fuga de gas",
        "chispa",
        "riesgo de incendio",
        "inundación",
        "sin luz",
        "sin electricidad",
        "ventana rota",
        "sin cerradura",
        "sin calefacción",
        "sin agua potable",
        "corte de agua",
        "aguas negras",
        "cable expuesto",
        "colapso",
    ],
    high: &[
        "fuga",
        "eléctric",
        "no funciona",
        "roto",
        "rota",
        "atascad",
        "tapad",
        "desborda",
        "plaga",
        "moho",
        "sin agua caliente",
        "daño por agua",
        "tubería expuesta",
    ],
    medium: &[
        "lento", "gotea", "goteo", "menor", "estétic", "pintura", "rayón", "suelto", "suelta",
        "mancha", "trabad", "ruidos",
    ],
};

/// Rule tiers for `locale`.
pub fn tiers(locale: Locale) -> &'static UrgencyTiers {
    match locale {
        Locale::En => &ENGLISH_TIERS,
        Locale::Es => &SPANISH_TIERS,
    }
}

/// Rule-based urgency for English text.
pub fn classify_urgency_fallback(text: &str) -> UrgencyLevel {
    classify_urgency_fallback_for(text, Locale::En)
}

/// Rule-based urgency for `text` using the tiers of `locale`.
///
/// Critical phrases win over high, high over medium. Never fails.
pub fn classify_urgency_fallback_for(text: &str, locale: Locale) -> UrgencyLevel {
    let lowered = text.to_lowercase();
    let tiers = tiers(locale);
    let matches = |phrases: &[&str]| phrases.iter().any(|p| lowered.contains(p));

    if matches(tiers.critical) {
        UrgencyLevel::CRITICAL
    } else if matches(tiers.high) {
        UrgencyLevel::HIGH
    } else if matches(tiers.medium) {
        UrgencyLevel::MEDIUM
    } else {
        UrgencyLevel::default()
    }
}

fn reply_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[1-4]\b").expect("static urgency pattern"))
}

/// Extract the urgency digit from a model reply.
///
/// Returns `None` when the reply holds no standalone digit 1–4.
pub fn parse_urgency_reply(reply: &str) -> Option<UrgencyLevel> {
    reply_pattern()
        .find(reply)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(UrgencyLevel::new)
}

/// Instruction sent to language models for urgency classification.
pub fn urgency_prompt(description: &str) -> String {
    format!(
        r#"Analyze this rental property maintenance request and determine urgency level from 1 to 4:

ISSUE: "{description}"

URGENCY SCALE:
1 - Low: Cosmetic/minor issues (paint touch-ups, loose handles, minor scratches, small stains)
2 - Medium: Functional issues needing attention soon (slow drains, minor leaks, appliance issues, sticking doors)
3 - High: Significant impact on living conditions (broken HVAC, major leaks, electrical problems, no hot water)
4 - Critical: Safety hazards or emergencies (gas leaks, no power, flooding, fire hazards, structural collapse)

Consider: Safety risk, property damage potential, health concerns, impact on basic living functions.
Respond with ONLY the number 1, 2, 3, or 4."#
    )
}
