//! Server span middleware.
//!
//! Wraps every request in an `http-request` span:
//! - Name: `"{METHOD} {route}"` (exported as `otel.name`), where route is the
//!   matched route template or the raw path when nothing matched
//! - Attributes: `otel.kind=server`, `http.request.method`, `http.route`,
//!   `url.path`, `request_id`, then `http.response.status_code`
//! - Status: `otel.status_code=ERROR` for 5xx responses and request timeouts (408)
//! - Parent: W3C trace context from the incoming headers

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{field, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::http::request::request_id;
use crate::observability::otel;

pub async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let request_id = request_id(request.headers()).to_string();

    let span = tracing::info_span!(
        "http-request",
        otel.name = %format!("{} {}", method, route),
        otel.kind = "server",
        http.request.method = %method,
        http.route = %route,
        url.path = %path,
        request_id = %request_id,
        http.response.status_code = field::Empty,
        otel.status_code = field::Empty,
    );
    span.set_parent(otel::extract_context(request.headers()));

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let status = response.status();

    span.record("http.response.status_code", u64::from(status.as_u16()));
    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        span.record("otel.status_code", "ERROR");
    }

    tracing::debug!(
        parent: &span,
        status = status.as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
