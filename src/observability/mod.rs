//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → tracing spans/events  → logging.rs (fmt layer)
//!                             → otel.rs (OTLP span export)
//!     → MetricsSink records   → metrics.rs (OTLP instruments, Prometheus)
//!
//! Every span and metric carries resource.rs identity.
//! ```
//!
//! # Design Decisions
//! - Providers are created once in [`init`] and flushed by [`TelemetryGuard::shutdown`]
//! - Handlers receive the metrics sink explicitly, never via global lookup
//! - A collector that cannot be reached degrades to local logs only

pub mod logging;
pub mod metrics;
pub mod otel;
pub mod resource;

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServiceConfig;
use self::metrics::{FanoutMetrics, MetricsSink, PrometheusMetrics};
use self::otel::OtelPipeline;
use self::resource::ResourceDescriptor;

/// Errors raised while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("exporter setup failed: {0}")]
    Exporter(String),

    #[error("subscriber setup failed: {0}")]
    Subscriber(String),
}

/// Owns the process-wide telemetry providers until shutdown.
pub struct TelemetryGuard {
    pipeline: Option<OtelPipeline>,
    metrics: Arc<dyn MetricsSink>,
}

impl TelemetryGuard {
    /// Sink to inject into request handlers.
    pub fn metrics(&self) -> Arc<dyn MetricsSink> {
        self.metrics.clone()
    }

    /// Whether spans and metrics are being exported over OTLP.
    pub fn exporting(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Flush pending spans and metrics.
    pub fn shutdown(self) {
        if let Some(pipeline) = self.pipeline {
            pipeline.shutdown();
            tracing::info!("Telemetry flushed");
        }
    }
}

/// Initialize logging, OTLP export and metric sinks.
///
/// Exporter failures are logged, not returned: the service keeps running
/// with local logs. Only a second global subscriber is a hard error.
pub fn init(
    config: &ServiceConfig,
    resource: &ResourceDescriptor,
) -> Result<TelemetryGuard, TelemetryError> {
    let (pipeline, export_error) = if config.telemetry.otlp_enabled {
        match otel::init_exporters(&config.telemetry, resource) {
            Ok(pipeline) => (Some(pipeline), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    logging::init_logging(&config.observability, pipeline.as_ref().map(OtelPipeline::tracer))?;

    if let Some(e) = export_error {
        tracing::error!(
            endpoint = %config.telemetry.otlp_endpoint,
            error = %e,
            "OTLP export unavailable, continuing with local logs"
        );
    }

    let mut sinks = FanoutMetrics::new();
    if let Some(pipeline) = &pipeline {
        sinks.push(Arc::new(pipeline.metrics()));
        tracing::info!(
            endpoint = %config.telemetry.otlp_endpoint,
            service = %resource.service_name(),
            version = %resource.service_version(),
            environment = %resource.environment(),
            "OpenTelemetry export initialized"
        );
    }

    if config.telemetry.prometheus_enabled {
        match config.telemetry.prometheus_address.parse::<SocketAddr>() {
            Ok(addr) => match metrics::install_prometheus(addr) {
                Ok(()) => sinks.push(Arc::new(PrometheusMetrics)),
                Err(e) => tracing::error!(error = %e, "Failed to start Prometheus endpoint"),
            },
            Err(_) => tracing::error!(
                prometheus_address = %config.telemetry.prometheus_address,
                "Failed to parse Prometheus address"
            ),
        }
    }

    if sinks.is_empty() {
        tracing::warn!("No metrics sink configured, request metrics are discarded");
    }

    Ok(TelemetryGuard {
        pipeline,
        metrics: Arc::new(sinks),
    })
}
