//! Prometheus collectors for outgoing API requests.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Metrics for API client operations
#[derive(Clone)]
pub struct ApiClientMetrics {
    pub registry: Registry,

    /// Requests by route pattern, method, and outcome
    pub requests_total: CounterVec,

    /// Request duration by route pattern and method
    pub request_duration_seconds: HistogramVec,

    /// Timeouts by route pattern and operation type
    pub timeouts_total: CounterVec,
}

impl ApiClientMetrics {
    /// Create collectors registered on a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Create collectors registered on `registry`
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new(
                "taskdeck_api_requests_total",
                "Total API requests by route, method, and outcome",
            ),
            &["route", "method", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "taskdeck_api_request_duration_seconds",
                "Duration of API requests",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["route", "method"],
        )?;

        let timeouts_total = CounterVec::new(
            Opts::new(
                "taskdeck_api_timeouts_total",
                "Total API request timeouts by route and operation type",
            ),
            &["route", "operation"],
        )?;

        // Register all metrics
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(timeouts_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            timeouts_total,
        })
    }

    /// Record a finished request
    pub fn record_request(&self, route: &str, method: &str, outcome: &str, duration: Duration) {
        self.requests_total
            .with_label_values(&[route, method, outcome])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[route, method])
            .observe(duration.as_secs_f64());
    }

    /// Record a timeout
    pub fn record_timeout(&self, route: &str, operation: &str) {
        self.timeouts_total
            .with_label_values(&[route, operation])
            .inc();
    }

    /// Render all collected metrics in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }
}
