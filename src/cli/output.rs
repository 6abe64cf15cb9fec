//! Output formatting helpers for CLI commands

use crate::classifier::{AnalysisResult, RiskLevel};
use crate::registry::ChainSummary;
use crate::urgency::UrgencyLevel;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

/// View model for provider display
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub name: String,
    pub enabled: bool,
    /// Why a provider contributes no strategies, if it does not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn risk_cell(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::High => "high".red().bold().to_string(),
        RiskLevel::Medium => "medium".yellow().to_string(),
        RiskLevel::Low => "low".green().to_string(),
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Format a classifier result as a two-column table
pub fn format_analysis_table(result: &AnalysisResult) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec![Cell::new("Components"), Cell::new(join_or_dash(&result.components))]);
    table.add_row(vec![Cell::new("Problems"), Cell::new(join_or_dash(&result.problems))]);
    table.add_row(vec![
        Cell::new("Severity"),
        Cell::new(join_or_dash(&result.severity_indicators)),
    ]);
    table.add_row(vec![Cell::new("Locations"), Cell::new(join_or_dash(&result.locations))]);
    table.add_row(vec![Cell::new("Score"), Cell::new(result.score)]);
    table.add_row(vec![Cell::new("Confidence"), Cell::new(result.confidence.as_str())]);
    table.add_row(vec![Cell::new("Risk"), Cell::new(risk_cell(result.risk_level))]);
    table.add_row(vec![
        Cell::new("Priority"),
        Cell::new(result.maintenance_priority.as_str()),
    ]);
    table.add_row(vec![
        Cell::new("Maintenance related"),
        Cell::new(if result.is_maintenance_related { "yes" } else { "no" }),
    ]);

    format!("{}\n{}", table, result.contextual_analysis)
}

/// Format an urgency level on one line
pub fn format_urgency(level: UrgencyLevel) -> String {
    let label = match level.value() {
        4 => level.label().red().bold().to_string(),
        3 => level.label().red().to_string(),
        2 => level.label().yellow().to_string(),
        _ => level.label().green().to_string(),
    };
    format!("Urgency: {} ({})", level.value(), label)
}

/// Format every chain as a table, one row per strategy in run order
pub fn format_chains_table(chains: &[ChainSummary], providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Task", "#", "Strategy", "Kind", "Priority", "Timeout"]);

    for chain in chains {
        for (i, strategy) in chain.strategies.iter().enumerate() {
            let task = if i == 0 { chain.task.to_string() } else { String::new() };
            table.add_row(vec![
                Cell::new(task),
                Cell::new(i + 1),
                Cell::new(&strategy.name),
                Cell::new(strategy.kind.to_string()),
                Cell::new(strategy.priority.map_or("-".to_string(), |p| p.to_string())),
                Cell::new(
                    strategy
                        .timeout_ms
                        .map_or("-".to_string(), |t| format!("{}ms", t)),
                ),
            ]);
        }
    }

    let mut out = table.to_string();
    for provider in providers {
        let status = if provider.enabled {
            "enabled".green().to_string()
        } else {
            "disabled".red().to_string()
        };
        out.push_str(&format!("\n{}: {}", provider.name, status));
        if let Some(note) = &provider.note {
            out.push_str(&format!(" ({})", note));
        }
    }
    out
}
