//! Maintenance request analysis handler.

use crate::api::{
    parse_locale, AnalyzeRequestBody, AnalyzeRequestResponse, ApiError, AppState,
    MessageResponse,
};
use crate::classifier::Locale;
use crate::logging::content_preview;
use crate::orchestrator::RuleStrategy;
use crate::strategy::merge::MergeRule;
use crate::strategy::{MergeInput, TextInput};
use crate::urgency::classify_urgency_fallback_for;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

async fn merge_and_rate(
    state: Arc<AppState>,
    input: MergeInput,
    locale: Locale,
) -> AnalyzeRequestResponse {
    let merged = state.strategies.merge.run(&input).await;
    let urgency = state
        .strategies
        .urgency
        .run(&TextInput::new(merged.value.clone(), locale))
        .await;

    info!(
        merge_strategy = %merged.strategy,
        urgency_strategy = %urgency.strategy,
        urgency = urgency.value.value(),
        "Request analysed"
    );

    AnalyzeRequestResponse {
        summary: merged.value,
        urgency_level: urgency.value.value(),
        strategy: Some(merged.strategy),
        urgency_strategy: Some(urgency.strategy),
        fallback: None,
    }
}

/// Rule-only answer used when the chain task itself failed.
fn rule_fallback(input: &MergeInput, locale: Locale) -> AnalyzeRequestResponse {
    let summary = MergeRule.apply(input);
    let urgency = classify_urgency_fallback_for(&summary, locale);
    AnalyzeRequestResponse {
        summary,
        urgency_level: urgency.value(),
        strategy: None,
        urgency_strategy: None,
        fallback: Some(true),
    }
}

/// POST /analyze-request
pub async fn analyze_request(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequestBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let locale = parse_locale(
        body.locale.as_deref(),
        state.config.analysis.default_locale,
        "locale",
    )?;

    let input = MergeInput::new(body.user_text, body.image_descriptions);
    if !input.has_content() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new("No content provided")),
        )
            .into_response());
    }

    if let Some(preview) =
        content_preview(&input.user_text, state.config.logging.enable_content_logging)
    {
        debug!(user_text = %preview, "Request text");
    }

    let response = match tokio::spawn(merge_and_rate(Arc::clone(&state), input.clone(), locale)).await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Request analysis task failed, using rule-based fallback");
            rule_fallback(&input, locale)
        }
    };

    Ok(Json(response).into_response())
}
