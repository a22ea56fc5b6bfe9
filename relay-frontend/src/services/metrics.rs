use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Process-wide Prometheus collectors.
pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub upstream_requests_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let upstream_requests_total = IntCounterVec::new(
            Opts::new(
                "relay_upstream_requests_total",
                "Calls to the inference service by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )
        .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(upstream_requests_total.clone()))
            .expect("collector can be registered");

        Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            upstream_requests_total,
        }
    }
}

pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Record the result of one call to the inference service.
pub fn record_upstream(endpoint: &str, outcome: &str) {
    metrics()
        .upstream_requests_total
        .with_label_values(&[endpoint, outcome])
        .inc();
}

pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics().registry.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
