//! Server configuration

use serde::{Deserialize, Serialize};

/// 20 MiB, enough for a handful of phone photos per request.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall deadline for outbound provider requests
    pub request_timeout_seconds: u64,
    pub max_body_bytes: usize,
    /// Origins allowed by CORS. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 120,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}
