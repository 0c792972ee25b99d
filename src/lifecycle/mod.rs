//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Telemetry → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests
//!     → Flush spans and metrics → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Telemetry is flushed only after the server has drained, so the last
//!   requests' spans are exported

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
