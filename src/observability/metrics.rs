//! Request metrics.
//!
//! # Metrics
//! - `product_api_requests_total` (counter): requests by endpoint, method
//! - `product_api_processing_seconds` (histogram): handler duration by endpoint
//!
//! # Design Decisions
//! - Handlers see only the [`MetricsSink`] trait, injected through app state
//! - OTLP instruments and the Prometheus facade are interchangeable sinks
//! - Instruments are lock-free and safe to update from concurrent requests

use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::observability::TelemetryError;

pub const REQUESTS_TOTAL: &str = "product_api_requests_total";
pub const PROCESSING_SECONDS: &str = "product_api_processing_seconds";

/// Destination for the per-request counter and duration histogram.
pub trait MetricsSink: Send + Sync {
    /// Count one handled request.
    fn increment_request(&self, endpoint: &str, method: &str);

    /// Record how long an instrumented handler took.
    fn record_processing(&self, endpoint: &str, elapsed: Duration);
}

/// Sink backed by OpenTelemetry instruments (exported over OTLP).
pub struct OtelMetrics {
    requests: Counter<u64>,
    processing: Histogram<f64>,
}

impl OtelMetrics {
    pub fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter(REQUESTS_TOTAL)
            .with_description("Total number of requests")
            .build();
        let processing = meter
            .f64_histogram(PROCESSING_SECONDS)
            .with_description("Processing time in seconds")
            .with_unit("s")
            .build();

        Self {
            requests,
            processing,
        }
    }
}

impl MetricsSink for OtelMetrics {
    fn increment_request(&self, endpoint: &str, method: &str) {
        self.requests.add(
            1,
            &[
                KeyValue::new("endpoint", endpoint.to_string()),
                KeyValue::new("method", method.to_string()),
            ],
        );
    }

    fn record_processing(&self, endpoint: &str, elapsed: Duration) {
        self.processing.record(
            elapsed.as_secs_f64(),
            &[KeyValue::new("endpoint", endpoint.to_string())],
        );
    }
}

/// Sink that writes through the `metrics` facade (Prometheus exposition).
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetrics;

impl MetricsSink for PrometheusMetrics {
    fn increment_request(&self, endpoint: &str, method: &str) {
        metrics::counter!(
            REQUESTS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string()
        )
        .increment(1);
    }

    fn record_processing(&self, endpoint: &str, elapsed: Duration) {
        metrics::histogram!(PROCESSING_SECONDS, "endpoint" => endpoint.to_string())
            .record(elapsed.as_secs_f64());
    }
}

/// Install the Prometheus recorder and its scrape listener.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), TelemetryError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of requests");
    metrics::describe_histogram!(
        PROCESSING_SECONDS,
        metrics::Unit::Seconds,
        "Processing time in seconds"
    );

    tracing::info!(address = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Forwards every record to each inner sink.
#[derive(Default, Clone)]
pub struct FanoutMetrics {
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl FanoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Arc<dyn MetricsSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MetricsSink for FanoutMetrics {
    fn increment_request(&self, endpoint: &str, method: &str) {
        for sink in &self.sinks {
            sink.increment_request(endpoint, method);
        }
    }

    fn record_processing(&self, endpoint: &str, elapsed: Duration) {
        for sink in &self.sinks {
            sink.record_processing(endpoint, elapsed);
        }
    }
}
