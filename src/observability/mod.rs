//! Observability module
//!
//! Logging, metrics, and the structured event stream for breathing
//! sessions.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter, StopReason};
pub use logging::{LogFormat, ansi_enabled, init_logging};
pub use metrics::init_metrics;
