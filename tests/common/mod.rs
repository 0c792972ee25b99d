//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use product_api::config::ServiceConfig;
use product_api::http::{build_router, AppState};
use product_api::observability::metrics::MetricsSink;

/// How the mock user service answers `GET /api/users/{id}`.
#[derive(Clone)]
pub enum UserBehavior {
    /// 200 with this JSON body.
    Json(Value),
    /// Sleep, then answer `{}`.
    Delay(Duration),
    /// 200 with a body that is not JSON.
    Text(&'static str),
}

#[derive(Clone)]
struct MockState {
    behavior: UserBehavior,
    seen: Arc<Mutex<Vec<HeaderMap>>>,
}

/// A running mock user service.
pub struct MockUserService {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<HeaderMap>>>,
}

impl MockUserService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Headers of every request received so far.
    pub fn seen_headers(&self) -> Vec<HeaderMap> {
        self.seen.lock().unwrap().clone()
    }
}

async fn user_handler(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.seen.lock().unwrap().push(headers);
    match state.behavior {
        UserBehavior::Json(body) => Json(body).into_response(),
        UserBehavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({})).into_response()
        }
        UserBehavior::Text(body) => (StatusCode::OK, body).into_response(),
    }
}

/// Start a mock user service on an ephemeral port.
pub async fn start_user_service(behavior: UserBehavior) -> MockUserService {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/users/{id}", routing::get(user_handler))
        .with_state(MockState {
            behavior,
            seen: seen.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUserService { addr, seen }
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Default config pointed at `user_service`, with OTLP export off.
pub fn test_config(user_service: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.downstream.base_url = user_service.to_string();
    config.telemetry.otlp_enabled = false;
    config
}

pub fn app(config: &ServiceConfig, metrics: Arc<dyn MetricsSink>) -> Router {
    build_router(config, AppState::new(config, metrics))
}

/// Issue `GET uri` against the router in-process.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    get_with_headers(app, uri, &[]).await
}

pub async fn get_with_headers(
    app: &Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Value) {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Metrics sink that keeps every record.
#[derive(Default)]
pub struct RecordingMetrics {
    requests: Mutex<Vec<(String, String)>>,
    observations: Mutex<Vec<(String, Duration)>>,
}

impl RecordingMetrics {
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn observations(&self) -> Vec<(String, Duration)> {
        self.observations.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingMetrics {
    fn increment_request(&self, endpoint: &str, method: &str) {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), method.to_string()));
    }

    fn record_processing(&self, endpoint: &str, elapsed: Duration) {
        self.observations
            .lock()
            .unwrap()
            .push((endpoint.to_string(), elapsed));
    }
}

/// A span as seen at close time.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub parent: Option<String>,
    pub fields: HashMap<String, String>,
    /// Levels of events emitted inside the span.
    pub events: Vec<String>,
}

impl CapturedSpan {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer recording every closed span with its fields.
#[derive(Clone, Default)]
pub struct SpanCapture {
    closed: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl SpanCapture {
    pub fn closed(&self) -> Vec<CapturedSpan> {
        self.closed.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<CapturedSpan> {
        self.closed()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S> Layer<S> for SpanCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut captured = CapturedSpan {
            name: attrs.metadata().name().to_string(),
            parent: span.parent().map(|parent| parent.name().to_string()),
            fields: HashMap::new(),
            events: Vec::new(),
        };
        attrs.record(&mut FieldVisitor(&mut captured.fields));
        span.extensions_mut().insert(captured);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        if let Some(captured) = span.extensions_mut().get_mut::<CapturedSpan>() {
            values.record(&mut FieldVisitor(&mut captured.fields));
        };
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.event_span(event) else { return };
        if let Some(captured) = span.extensions_mut().get_mut::<CapturedSpan>() {
            captured.events.push(event.metadata().level().to_string());
        };
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else { return };
        let captured = span.extensions_mut().remove::<CapturedSpan>();
        if let Some(captured) = captured {
            self.closed.lock().unwrap().push(captured);
        }
    }
}
