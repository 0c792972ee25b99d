//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs parse
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::new("service.name", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    check_url(&mut errors, "downstream.base_url", &config.downstream.base_url);
    if config.downstream.timeout_ms == 0 {
        errors.push(ValidationError::new("downstream.timeout_ms", "must be greater than 0"));
    }

    if config.telemetry.otlp_enabled {
        check_url(&mut errors, "telemetry.otlp_endpoint", &config.telemetry.otlp_endpoint);
        if config.telemetry.metric_interval_secs == 0 {
            errors.push(ValidationError::new(
                "telemetry.metric_interval_secs",
                "must be greater than 0",
            ));
        }
    }

    if config.telemetry.prometheus_enabled
        && config.telemetry.prometheus_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "telemetry.prometheus_address",
            format!("'{}' is not a socket address", config.telemetry.prometheus_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("'{}': {}", value, e))),
    }
}
