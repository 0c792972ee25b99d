//! Downstream dependencies.
//!
//! # Data Flow
//! ```text
//! handler (span: get-product-by-id)
//!     → client.rs (child span: call-user-service, traceparent injected)
//!     → user service GET /api/users/{id}, bounded by timeout
//!     → Ok(json) | Err(DownstreamError)   (never retried, never raised to HTTP)
//! ```

pub mod client;

use thiserror::Error;

pub use client::UserServiceClient;

/// Why a downstream call produced no data.
///
/// Every variant degrades the same way (a null owner); the distinction
/// only feeds the span's `error.type` attribute.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// The call did not complete within the configured timeout.
    #[error("user service timed out after {0} ms")]
    Timeout(u64),

    /// No connection could be established.
    #[error("user service unreachable: {0}")]
    Connect(String),

    /// The response body was not valid JSON.
    #[error("user service returned an invalid body: {0}")]
    Decode(String),

    /// Any other transport failure.
    #[error("user service request failed: {0}")]
    Request(String),
}

impl DownstreamError {
    /// Short classification recorded as `error.type`.
    pub fn kind(&self) -> &'static str {
        match self {
            DownstreamError::Timeout(_) => "timeout",
            DownstreamError::Connect(_) => "connect",
            DownstreamError::Decode(_) => "decode",
            DownstreamError::Request(_) => "request",
        }
    }
}

impl From<reqwest::Error> for DownstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DownstreamError::Timeout(0)
        } else if e.is_connect() {
            DownstreamError::Connect(e.to_string())
        } else if e.is_decode() {
            DownstreamError::Decode(e.to_string())
        } else {
            DownstreamError::Request(e.to_string())
        }
    }
}
