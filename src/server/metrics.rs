use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all pokecatch metrics
const PREFIX: &str = "pokecatch";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Catching
    pub static ref CATCH_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_catch_attempts_total"), "Catch attempts by outcome"),
        &["outcome"]
    ).expect("Failed to create catch_attempts_total metric");

    pub static ref RELEASES_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_releases_total"),
        "Total released Pokemon"
    ).expect("Failed to create releases_total metric");

    // Upstream lookups
    pub static ref LOOKUP_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_lookup_duration_seconds"),
            "PokeAPI lookup duration in seconds"
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0])
    ).expect("Failed to create lookup_duration_seconds metric");

    pub static ref LOOKUP_FAILURES_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_lookup_failures_total"),
        "Total failed PokeAPI lookups"
    ).expect("Failed to create lookup_failures_total metric");
}

/// Register all metrics with the registry. Safe to call more than once.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CATCH_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RELEASES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LOOKUP_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(LOOKUP_FAILURES_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// `outcome` is one of `caught`, `fled`, `limit_reached`, `lookup_failed`.
pub fn record_catch_attempt(outcome: &str) {
    CATCH_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_release() {
    RELEASES_TOTAL.inc();
}

pub fn record_lookup(success: bool, duration: Duration) {
    LOOKUP_DURATION_SECONDS.observe(duration.as_secs_f64());
    if !success {
        LOOKUP_FAILURES_TOTAL.inc();
    }
}

/// Collapses numeric path segments so ids do not blow up label cardinality.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
