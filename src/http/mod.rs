//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → middleware/trace.rs (server span, trace context extraction)
//!     → handlers.rs (route logic)
//!         → instrumented.rs (operation span, counter, histogram)
//!         → downstream (child span, user service)
//!     → JSON response
//! ```

pub mod handlers;
pub mod instrumented;
pub mod middleware;
pub mod request;
pub mod server;

pub use instrumented::{endpoints, RequestTelemetry};
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
