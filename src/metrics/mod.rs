//! # Metrics Collection Module
//!
//! Prometheus export of fallback-chain and HTTP activity.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `upkeep_strategy_attempts_total{task, strategy, result}` - Every strategy attempt
//! - `upkeep_chain_runs_total{task, strategy}` - Chain runs by producing strategy
//! - `upkeep_http_requests_total{method, status}` - Handled HTTP requests
//!
//! **Histograms:**
//! - `upkeep_strategy_duration_seconds{task, strategy}` - Attempt latency
//! - `upkeep_http_request_duration_seconds{method}` - Request latency
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! unit tests need no setup.

pub mod handler;

pub use metrics_exporter_prometheus::PrometheusBuilder;
pub use metrics_exporter_prometheus::PrometheusHandle;

use crate::orchestrator::{AttemptResult, Task};
use std::time::{Duration, Instant};

/// Startup time and the Prometheus handle used for rendering.
pub struct MetricsCollector {
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(start_time: Instant, prometheus_handle: PrometheusHandle) -> Self {
        Self {
            start_time,
            prometheus_handle,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Record one strategy attempt.
pub fn record_attempt(task: Task, strategy: &str, result: AttemptResult, elapsed: Duration) {
    metrics::counter!(
        "upkeep_strategy_attempts_total",
        "task" => task.as_str(),
        "strategy" => strategy.to_string(),
        "result" => result.as_str()
    )
    .increment(1);
    metrics::histogram!(
        "upkeep_strategy_duration_seconds",
        "task" => task.as_str(),
        "strategy" => strategy.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record which strategy produced a chain's result.
pub fn record_chain_result(task: Task, strategy: &str) {
    metrics::counter!(
        "upkeep_chain_runs_total",
        "task" => task.as_str(),
        "strategy" => strategy.to_string()
    )
    .increment(1);
}

pub fn record_http_request(method: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "upkeep_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "upkeep_http_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Initialize Prometheus metrics exporter with custom histogram buckets.
///
/// Buckets span fast rule-based answers (milliseconds) up to slow model
/// calls: [0.005, 0.025, 0.1, 0.25, 0.5, 1, 2.5, 5, 10, 30, 60] seconds.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[
        0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("upkeep_strategy_duration_seconds".to_string()),
            duration_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("upkeep_http_request_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}
