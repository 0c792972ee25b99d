//! OpenTelemetry export and trace context propagation.
//!
//! # Responsibilities
//! - Build the OTLP span exporter and batching tracer provider
//! - Build the OTLP metric exporter and periodic meter provider
//! - Extract W3C trace context from incoming requests
//! - Inject trace context into outbound requests
//!
//! Export is best effort: the batch processor and periodic reader run on
//! background tasks, so a down collector never blocks a request.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::{
    global,
    metrics::MeterProvider as _,
    propagation::{Extractor, Injector},
    trace::TracerProvider as _,
    Context,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    runtime,
    trace::{Config, Tracer, TracerProvider},
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::TelemetryConfig;
use crate::observability::metrics::OtelMetrics;
use crate::observability::resource::ResourceDescriptor;
use crate::observability::TelemetryError;

/// Instrumentation scope for every tracer and meter of this service.
pub const INSTRUMENTATION_SCOPE: &str = "product-api";

/// Providers created by [`init_exporters`].
pub struct OtelPipeline {
    pub tracer_provider: TracerProvider,
    pub meter_provider: SdkMeterProvider,
}

impl OtelPipeline {
    /// Tracer handed to the `tracing-opentelemetry` layer.
    pub fn tracer(&self) -> Tracer {
        self.tracer_provider.tracer(INSTRUMENTATION_SCOPE)
    }

    /// Counter and histogram backed by the OTLP meter provider.
    pub fn metrics(&self) -> OtelMetrics {
        OtelMetrics::new(&self.meter_provider.meter(INSTRUMENTATION_SCOPE))
    }

    /// Flush pending spans and metrics, then stop the exporters.
    pub fn shutdown(self) {
        if let Err(e) = self.tracer_provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
        if let Err(e) = self.meter_provider.shutdown() {
            tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
    }
}

/// Build OTLP/gRPC exporters for spans and metrics and register them as the
/// process-wide providers. Must run inside a Tokio runtime.
#[allow(deprecated)]
pub fn init_exporters(
    config: &TelemetryConfig,
    resource: &ResourceDescriptor,
) -> Result<OtelPipeline, TelemetryError> {
    let timeout = Duration::from_secs(config.export_timeout_secs);

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .with_timeout(timeout)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(span_exporter, runtime::Tokio)
        .with_config(Config::default().with_resource(resource.to_resource()))
        .build();

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .with_timeout(timeout)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let reader = PeriodicReader::builder(metric_exporter, runtime::Tokio)
        .with_interval(Duration::from_secs(config.metric_interval_secs))
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource.to_resource())
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    Ok(OtelPipeline {
        tracer_provider,
        meter_provider,
    })
}

/// Extract the caller's trace context from request headers.
pub fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

/// Inject the trace context of `span` into outbound request headers.
pub fn inject_span_context(span: &tracing::Span, headers: &mut HeaderMap) {
    let context = span.context();
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&context, &mut HeaderInjector(headers))
    });
}

// Header extractor for OpenTelemetry propagation
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

// Header injector for OpenTelemetry propagation
struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::propagation::TextMapPropagator;
    use opentelemetry::trace::TraceContextExt;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_extract_and_inject_traceparent() {
        let propagator = TraceContextPropagator::new();

        let mut incoming = HeaderMap::new();
        incoming.insert("traceparent", HeaderValue::from_static(TRACEPARENT));
        let context = propagator.extract(&HeaderExtractor(&incoming));
        let span_context = context.span().span_context().clone();
        assert!(span_context.is_valid());
        assert_eq!(
            span_context.trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );

        let mut outgoing = HeaderMap::new();
        propagator.inject_context(&context, &mut HeaderInjector(&mut outgoing));
        assert_eq!(outgoing.get("traceparent").unwrap(), TRACEPARENT);
    }

    #[test]
    fn test_extract_without_headers_is_empty() {
        let propagator = TraceContextPropagator::new();
        let headers = HeaderMap::new();
        let context = propagator.extract(&HeaderExtractor(&headers));
        assert!(!context.span().span_context().is_valid());
    }
}
