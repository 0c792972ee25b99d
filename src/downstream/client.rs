//! User service client with timeout and error handling.
//!
//! # Responsibilities
//! - Fetch a user record as JSON
//! - Trace each call in its own `call-user-service` span
//! - Propagate trace context to the user service
//! - Turn every failure into a [`DownstreamError`] instead of panicking or retrying

use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{field, Instrument, Span};

use crate::config::DownstreamConfig;
use crate::downstream::DownstreamError;
use crate::observability::otel;

/// Client for `GET {base_url}/api/users/{id}`.
#[derive(Debug, Clone)]
pub struct UserServiceClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UserServiceClient {
    /// Service-to-service calls go direct; proxy environment variables are ignored.
    pub fn new(config: &DownstreamConfig) -> Self {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Fetch user `id`.
    ///
    /// The call runs inside a child span of the current span. On failure the
    /// span is marked as errored and the error is returned; callers decide
    /// how to degrade.
    pub async fn fetch_user(&self, id: u64) -> Result<Value, DownstreamError> {
        let url = format!("{}/api/users/{}", self.base_url, id);
        let span = tracing::info_span!(
            "call-user-service",
            otel.kind = "client",
            http.request.method = "GET",
            url.full = %url,
            http.status_code = field::Empty,
            otel.status_code = field::Empty,
            otel.status_message = field::Empty,
            error.type = field::Empty,
        );

        let result = self.call(&url, &span).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.record("otel.status_code", "ERROR");
            span.record("otel.status_message", field::display(e));
            span.record("error.type", e.kind());
            span.in_scope(|| {
                tracing::warn!(user_id = id, error = %e, "User service call failed");
            });
        }

        result
    }

    async fn call(&self, url: &str, span: &Span) -> Result<Value, DownstreamError> {
        let mut headers = reqwest::header::HeaderMap::new();
        otel::inject_span_context(span, &mut headers);

        let request = async {
            let response = self
                .http
                .get(url)
                .headers(headers)
                .send()
                .await
                .map_err(DownstreamError::from)?;

            span.record("http.status_code", u64::from(response.status().as_u16()));

            response.json::<Value>().await.map_err(DownstreamError::from)
        };

        match timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(DownstreamError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}
