//! Classify and urgency command handlers

use crate::cli::output::{format_analysis_table, format_urgency};
use crate::cli::{ClassifyArgs, UrgencyArgs};
use crate::classifier::classify_with_locale;
use crate::urgency::classify_urgency_fallback_for;
use serde_json::json;

/// Handle `upkeep classify` command
pub fn handle_classify(args: &ClassifyArgs) -> Result<String, Box<dyn std::error::Error>> {
    let result = classify_with_locale(&args.text, args.locale);

    if args.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(format_analysis_table(&result))
    }
}

/// Handle `upkeep urgency` command
pub fn handle_urgency(args: &UrgencyArgs) -> Result<String, Box<dyn std::error::Error>> {
    let level = classify_urgency_fallback_for(&args.text, args.locale);

    if args.json {
        Ok(serde_json::to_string_pretty(&json!({
            "urgencyLevel": level,
            "label": level.label(),
            "strategy": "urgency-rule",
        }))?)
    } else {
        Ok(format_urgency(level))
    }
}
