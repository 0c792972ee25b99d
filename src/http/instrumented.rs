//! Per-route telemetry contract.
//!
//! Every instrumented route runs its work inside an operation span and
//! emits exactly one counter increment and one histogram observation per
//! invocation. Emission normally happens in [`RequestTelemetry::finish`],
//! right before the response is built; if the work is dropped early (request
//! timeout, panic unwinding) the drop guard emits instead, so no exit path
//! skips it.

use axum::http::Method;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span};

use crate::observability::metrics::MetricsSink;

/// Route identifiers used as the `endpoint` tag.
pub mod endpoints {
    pub const HOME: &str = "/";
    pub const PRODUCTS: &str = "/api/products";
    pub const PRODUCT_BY_ID: &str = "/api/products/:id";
}

/// Metric bookkeeping for one handler invocation.
pub struct RequestTelemetry {
    metrics: Arc<dyn MetricsSink>,
    endpoint: &'static str,
    method: Method,
    started: Instant,
    timed: bool,
    emitted: bool,
}

impl RequestTelemetry {
    /// Counter only, no duration histogram.
    pub fn counted(metrics: Arc<dyn MetricsSink>, endpoint: &'static str, method: Method) -> Self {
        Self::start(metrics, endpoint, method, false)
    }

    /// Counter plus duration histogram; the clock starts now.
    pub fn timed(metrics: Arc<dyn MetricsSink>, endpoint: &'static str, method: Method) -> Self {
        Self::start(metrics, endpoint, method, true)
    }

    fn start(
        metrics: Arc<dyn MetricsSink>,
        endpoint: &'static str,
        method: Method,
        timed: bool,
    ) -> Self {
        Self {
            metrics,
            endpoint,
            method,
            started: Instant::now(),
            timed,
            emitted: false,
        }
    }

    /// Record the metrics and return the measured duration.
    pub fn finish(mut self) -> Duration {
        self.emit()
    }

    fn emit(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.emitted {
            self.emitted = true;
            if self.timed {
                self.metrics.record_processing(self.endpoint, elapsed);
            }
            self.metrics.increment_request(self.endpoint, self.method.as_str());
        }
        elapsed
    }
}

impl Drop for RequestTelemetry {
    fn drop(&mut self) {
        if !self.emitted {
            tracing::debug!(endpoint = self.endpoint, "Handler exited early, emitting metrics from guard");
            self.emit();
        }
    }
}

/// Run `work` inside `span`, timing it for `endpoint`.
///
/// The span is entered before the clock starts and closes after metrics are
/// recorded, so span open → attributes → metrics → span close holds for
/// every invocation.
pub async fn instrument_route<F, T>(
    metrics: &Arc<dyn MetricsSink>,
    endpoint: &'static str,
    method: Method,
    span: Span,
    work: F,
) -> T
where
    F: Future<Output = T>,
{
    let metrics = metrics.clone();
    async move {
        let telemetry = RequestTelemetry::timed(metrics, endpoint, method);
        let output = work.await;
        let elapsed = telemetry.finish();
        tracing::debug!(endpoint, elapsed_ms = elapsed.as_millis() as u64, "Handler finished");
        output
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        requests: Mutex<Vec<(String, String)>>,
        observations: Mutex<Vec<(String, Duration)>>,
    }

    impl MetricsSink for Recorded {
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

    #[test]
    fn test_finish_emits_once() {
        let recorded = Arc::new(Recorded::default());
        let telemetry = RequestTelemetry::timed(recorded.clone(), endpoints::PRODUCTS, Method::GET);
        telemetry.finish();

        assert_eq!(
            *recorded.requests.lock().unwrap(),
            vec![("/api/products".to_string(), "GET".to_string())]
        );
        assert_eq!(recorded.observations.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_drop_guard_emits() {
        let recorded = Arc::new(Recorded::default());
        {
            let _telemetry =
                RequestTelemetry::timed(recorded.clone(), endpoints::PRODUCT_BY_ID, Method::GET);
        }
        assert_eq!(recorded.requests.lock().unwrap().len(), 1);
        assert_eq!(recorded.observations.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_counted_skips_histogram() {
        let recorded = Arc::new(Recorded::default());
        RequestTelemetry::counted(recorded.clone(), endpoints::HOME, Method::GET).finish();
        assert_eq!(recorded.requests.lock().unwrap().len(), 1);
        assert!(recorded.observations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_work_still_emits() {
        let recorded = Arc::new(Recorded::default());
        let sink: Arc<dyn MetricsSink> = recorded.clone();
        let work = instrument_route(
            &sink,
            endpoints::PRODUCTS,
            Method::GET,
            tracing::info_span!("get-products"),
            tokio::time::sleep(Duration::from_secs(60)),
        );

        let result = tokio::time::timeout(Duration::from_millis(20), work).await;
        assert!(result.is_err());
        assert_eq!(recorded.requests.lock().unwrap().len(), 1);
        assert_eq!(recorded.observations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duration_covers_work() {
        let recorded = Arc::new(Recorded::default());
        let sink: Arc<dyn MetricsSink> = recorded.clone();
        instrument_route(
            &sink,
            endpoints::PRODUCTS,
            Method::GET,
            tracing::info_span!("get-products"),
            tokio::time::sleep(Duration::from_millis(30)),
        )
        .await;

        let observations = recorded.observations.lock().unwrap();
        assert!(observations[0].1 >= Duration::from_millis(30));
    }
}
