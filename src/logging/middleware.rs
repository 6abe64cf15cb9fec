//! Request ID generation and request logging middleware

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the request's correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate a new request ID using UUID v4
///
/// Returns a unique correlation ID that ties every log line of one request
/// together, including each fallback attempt.
///
/// # Examples
///
/// ```
/// use upkeep::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Log one line per request and tag the response with its request ID.
///
/// Strategy logs emitted while the handler runs are nested in the
/// `request` span and inherit `request_id`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = generate_request_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let span = tracing::info_span!("request", request_id = %request_id, method = %method, path = %path);
    let mut response = next.run(request).instrument(span).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    crate::metrics::record_http_request(method.as_str(), status, elapsed);

    if status >= 500 {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = elapsed.as_millis() as u64,
            "Request failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = elapsed.as_millis() as u64,
            "Request completed"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
