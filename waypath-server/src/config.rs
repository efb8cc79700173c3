//! Typed startup configuration, read once from environment variables.

use std::time::Duration;

/// Server-wide configuration. Constructed once at startup; never mutated after.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub port: u16,
}

impl Config {
    /// Reads configuration from the environment, falling back to documented defaults.
    /// `RUST_LOG` is consumed directly by the tracing-subscriber init, not here.
    pub fn from_env() -> Self {
        let upstream_url = std::env::var("UPSTREAM_URL")
            .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string());
        let upstream_timeout_ms = std::env::var("UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);
        let port = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000);

        Self { upstream_url, upstream_timeout: Duration::from_millis(upstream_timeout_ms), port }
    }
}
