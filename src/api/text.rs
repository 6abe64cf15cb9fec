//! Summarize and translate handlers.

use crate::api::{
    parse_locale, ApiError, AppState, SummarizeRequest, SummarizeResponse, TranslateRequest,
    TranslateResponse,
};
use crate::strategy::{TextInput, TranslateInput};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /summarize
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(body) = body?;
    if body.text.trim().is_empty() {
        return Err(ApiError::invalid_param("text", "No text provided"));
    }
    let locale = parse_locale(
        body.locale.as_deref(),
        state.config.analysis.default_locale,
        "locale",
    )?;

    let outcome = state
        .strategies
        .summarize
        .run(&TextInput::new(body.text, locale))
        .await;

    Ok(Json(SummarizeResponse {
        summary: outcome.value,
        strategy: outcome.strategy,
    }))
}

/// POST /translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(body) = body?;
    if body.text.trim().is_empty() {
        return Err(ApiError::invalid_param("text", "No text provided"));
    }
    let source = parse_locale(
        body.source.as_deref(),
        state.config.analysis.default_locale,
        "source",
    )?;
    let target = body
        .target
        .parse()
        .map_err(|e: String| ApiError::invalid_param("target", &e))?;

    let outcome = state
        .strategies
        .translate
        .run(&TranslateInput {
            text: body.text,
            source,
            target,
        })
        .await;

    Ok(Json(TranslateResponse {
        translation: outcome.value,
        target,
        strategy: outcome.strategy,
    }))
}
