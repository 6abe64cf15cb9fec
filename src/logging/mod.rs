//! Structured logging module for request tracing
//!
//! This module provides utilities for structured logging of API requests,
//! including filter construction, request ID generation, and content previews.

pub mod fields;
pub mod middleware;

pub use fields::{content_preview, truncate_for_log};
pub use middleware::{generate_request_id, log_requests, REQUEST_ID_HEADER};

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
///
/// # Examples
///
/// ```
/// use upkeep::config::LoggingConfig;
/// use upkeep::logging::build_filter_directives;
///
/// let mut config = LoggingConfig::default();
/// config.component_levels.insert("orchestrator".to_string(), "debug".to_string());
///
/// let filter_str = build_filter_directives(&config);
/// assert_eq!(filter_str, "info,upkeep::orchestrator=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    for (component, level) in &config.component_levels {
        filter_str.push_str(&format!(",upkeep::{}={}", component, level));
    }

    filter_str
}
