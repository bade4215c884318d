//! Prometheus metrics for outgoing API calls.

use std::time::Duration;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

/// Metrics collected by [`ApiClient`](super::api_client::ApiClient)
#[derive(Clone)]
pub struct ClientMetrics {
    /// API requests by route, method, and outcome
    pub requests_total: CounterVec,

    /// API request duration by route and method
    pub request_duration_seconds: HistogramVec,
}

impl ClientMetrics {
    /// Create the collectors and register them on `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new(
                "permuta_api_requests_total",
                "Total API requests by route, method, and outcome",
            ),
            &["route", "method", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "permuta_api_request_duration_seconds",
                "Duration of API requests",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["route", "method"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
        })
    }

    pub fn record(&self, route: &str, method: &str, outcome: &str, duration: Duration) {
        self.requests_total
            .with_label_values(&[route, method, outcome])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[route, method])
            .observe(duration.as_secs_f64());
    }
}
