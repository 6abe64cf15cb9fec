//! # Analysis API
//!
//! HTTP endpoints for maintenance photo and request analysis.
//!
//! ## Endpoints
//!
//! - `GET /` - Liveness message
//! - `GET /health` - Uptime and the strategy chain of every task
//! - `GET /metrics` - Prometheus metrics
//! - `POST /analyze-image` - Caption, classify and optionally expand/translate one photo
//! - `POST /analyze-multiple-images` - Same, per file, for several photos
//! - `POST /analyze-request` - Merge tenant text with captions and rate urgency
//! - `POST /summarize` - Summarize a request text
//! - `POST /translate` - Translate a request text
//!
//! ## Example
//!
//! ```no_run
//! use upkeep::api::{create_router, AppState};
//! use upkeep::config::UpkeepConfig;
//! use upkeep::registry::StrategyRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(UpkeepConfig::default());
//! let strategies = Arc::new(StrategyRegistry::rule_based(&config.analysis));
//!
//! let state = Arc::new(AppState::new(config, strategies));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is answered with a JSON body. Validation errors use the
//! envelope below; pipeline failures degrade to rule-based answers instead
//! of erroring.
//! ```json
//! {
//!   "error": {
//!     "message": "File must be an image",
//!     "type": "invalid_request_error",
//!     "param": "file",
//!     "code": "invalid_image"
//!   }
//! }
//! ```

mod health;
mod images;
mod request;
mod text;
pub mod types;

pub use types::*;

use crate::config::UpkeepConfig;
use crate::metrics::MetricsCollector;
use crate::registry::StrategyRegistry;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<UpkeepConfig>,
    /// Fallback chains, built once at startup.
    pub strategies: Arc<StrategyRegistry>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(config: Arc<UpkeepConfig>, strategies: Arc<StrategyRegistry>) -> Self {
        let start_time = Instant::now();

        // Reuses a detached handle when a recorder is already installed (tests)
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            crate::metrics::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        Self {
            config,
            strategies,
            start_time,
            metrics: Arc::new(MetricsCollector::new(start_time, prometheus_handle)),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/analyze-image", post(images::analyze_image))
        .route("/analyze-multiple-images", post(images::analyze_multiple_images))
        .route("/analyze-request", post(request::analyze_request))
        .route("/summarize", post(text::summarize))
        .route("/translate", post(text::translate))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors)
        .layer(middleware::from_fn(crate::logging::log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
