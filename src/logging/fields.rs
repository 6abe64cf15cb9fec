//! Field helpers for structured logging

/// Preview length used for tenant text and captions.
pub const PREVIEW_CHARS: usize = 100;

/// Truncate a string for logging, on a character boundary.
///
/// # Examples
///
/// ```
/// use upkeep::logging::truncate_for_log;
///
/// assert_eq!(truncate_for_log("gas leak", 3), "gas...");
/// assert_eq!(truncate_for_log("gas", 10), "gas");
/// ```
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Text preview for logs (privacy-safe)
///
/// Returns None if content logging is disabled or the text is blank.
pub fn content_preview(text: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging || text.trim().is_empty() {
        return None;
    }
    Some(truncate_for_log(text.trim(), PREVIEW_CHARS))
}
