//! Liveness and health endpoint handlers.

use crate::api::{AppState, MessageResponse};
use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    /// Strategy names per task, in run order.
    pub strategies: BTreeMap<&'static str, Vec<String>>,
}

/// GET / - Liveness message.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Maintenance Analysis API is running!"))
}

/// GET /health - Uptime and configured chains.
///
/// Always healthy: every chain ends in a rule-based strategy.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let strategies = state
        .strategies
        .chains()
        .into_iter()
        .map(|chain| {
            let names = chain.strategies.into_iter().map(|s| s.name).collect();
            (chain.task.as_str(), names)
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.metrics.uptime_seconds(),
        strategies,
    })
}
