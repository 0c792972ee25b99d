//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured filter
//! - When export is on, the same spans feed the OpenTelemetry layer
//! - The log filter only gates console output; exported spans are filtered
//!   separately so a quiet log level never drops traces

use opentelemetry_sdk::trace::Tracer;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::TelemetryError;

/// Spans and events from this crate at `INFO` or above are exported.
fn export_filter() -> Targets {
    Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::INFO)
}

/// Build the layered subscriber without installing it.
pub fn subscriber(
    config: &ObservabilityConfig,
    tracer: Option<Tracer>,
) -> impl Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    let otel_layer = tracer.map(|tracer| {
        tracing_opentelemetry::layer()
            .with_tracer(tracer)
            .with_filter(export_filter())
    });

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .with(otel_layer)
}

/// Install the global subscriber: filter, formatter, and the optional
/// OpenTelemetry bridge.
pub fn init_logging(
    config: &ObservabilityConfig,
    tracer: Option<Tracer>,
) -> Result<(), TelemetryError> {
    subscriber(config, tracer)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))
}
