//! Contextual summary sentence for an [`AnalysisResult`].

use super::{AnalysisResult, Locale, RiskLevel};

/// Fixed sentence used when no category produced a clause.
pub const DEFAULT_SUMMARY_EN: &str = "Basic maintenance assessment completed.";
pub const DEFAULT_SUMMARY_ES: &str = "Evaluación básica de mantenimiento completada.";

struct Phrases {
    located: &'static str,
    affects: &'static str,
    issues: &'static str,
    severity: &'static str,
    high: &'static str,
    medium: &'static str,
    low: &'static str,
    default: &'static str,
}

const ENGLISH: Phrases = Phrases {
    located: "Located in",
    affects: "Affects",
    issues: "Issues include",
    severity: "Severity indicators:",
    high: "High risk requiring immediate attention",
    medium: "Medium risk needing prompt inspection",
    low: "Low risk - routine maintenance recommended",
    default: DEFAULT_SUMMARY_EN,
};

const SPANISH: Phrases = Phrases {
    located: "Ubicado en",
    affects: "Afecta",
    issues: "Problemas incluyen",
    severity: "Indicadores de gravedad:",
    high: "Riesgo alto que requiere atención inmediata",
    medium: "Riesgo medio que necesita inspección pronta",
    low: "Riesgo bajo - se recomienda mantenimiento de rutina",
    default: DEFAULT_SUMMARY_ES,
};

fn phrases(locale: Locale) -> &'static Phrases {
    match locale {
        Locale::En => &ENGLISH,
        Locale::Es => &SPANISH,
    }
}

/// Build the contextual summary from the matched lists and risk level.
///
/// Clauses appear in fixed order (locations, components, problems,
/// severity) followed by the risk clause, joined with ". ".
pub fn contextual_summary(result: &AnalysisResult) -> String {
    let phrases = phrases(result.locale);
    let mut parts = Vec::with_capacity(5);

    if !result.locations.is_empty() {
        parts.push(format!("{} {}", phrases.located, result.locations.join(", ")));
    }
    if !result.components.is_empty() {
        parts.push(format!("{} {}", phrases.affects, result.components.join(", ")));
    }
    if !result.problems.is_empty() {
        parts.push(format!("{} {}", phrases.issues, result.problems.join(", ")));
    }
    if !result.severity_indicators.is_empty() {
        parts.push(format!(
            "{} {}",
            phrases.severity,
            result.severity_indicators.join(", ")
        ));
    }

    if parts.is_empty() {
        return phrases.default.to_string();
    }

    parts.push(
        match result.risk_level {
            RiskLevel::High => phrases.high,
            RiskLevel::Medium => phrases.medium,
            RiskLevel::Low => phrases.low,
        }
        .to_string(),
    );

    format!("{}.", parts.join(". "))
}
