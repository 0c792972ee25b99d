//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default collector endpoint when `OTEL_EXPORTER_OTLP_ENDPOINT` is unset.
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://otel-collector:4317";

/// Root configuration for the product API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Identity attached to every emitted span and metric.
    pub service: ServiceIdentity,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Downstream user service settings.
    pub downstream: DownstreamConfig,

    /// Simulated database latency.
    pub simulation: SimulationConfig,

    /// Telemetry export settings.
    pub telemetry: TelemetryConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Service identity (resource attributes).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceIdentity {
    /// `service.name`
    pub name: String,

    /// `service.version`
    pub version: String,

    /// `deployment.environment`
    pub environment: String,
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self {
            name: "product-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Downstream user service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Base URL of the user service (e.g., "http://demo-app:8080").
    pub base_url: String,

    /// Upper bound for one outbound call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://demo-app:8080".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Fixed delays standing in for database queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay for the product listing, in milliseconds.
    pub list_delay_ms: u64,

    /// Delay for the single product lookup, in milliseconds.
    pub lookup_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            list_delay_ms: 100,
            lookup_delay_ms: 50,
        }
    }
}

/// Telemetry export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Export spans and metrics over OTLP.
    pub otlp_enabled: bool,

    /// OTLP/gRPC collector endpoint.
    pub otlp_endpoint: String,

    /// Exporter timeout in seconds.
    pub export_timeout_secs: u64,

    /// Interval between metric exports in seconds.
    pub metric_interval_secs: u64,

    /// Expose a Prometheus scrape endpoint as well.
    pub prometheus_enabled: bool,

    /// Prometheus endpoint bind address.
    pub prometheus_address: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_enabled: true,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            export_timeout_secs: 10,
            metric_interval_secs: 60,
            prometheus_enabled: false,
            prometheus_address: "0.0.0.0:9464".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Output format: "pretty" or "json".
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "product_api=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
