//! Metrics configuration.

use std::env;

/// Configuration for client-side request metrics
#[derive(Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // A short-lived CLI process has nobody scraping it
        Self { enabled: false }
    }
}

impl MetricsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let enabled = env::var("TASKDECK_METRICS_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Self { enabled }
    }
}
