//! Product API: a traced demo web service.
//!
//! Serves a small product catalog, enriches single products with their
//! owner from a downstream user service, and exports traces and metrics
//! over OTLP.

pub mod catalog;
pub mod config;
pub mod downstream;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
