//! Breathing cycle engine
//!
//! Drives the inhale → hold → exhale state machine along the triangle.
//! Phase is never stored independently: it is recomputed from elapsed
//! time and the pattern on every tick.
//!
//! # Architecture
//!
//! - [`Phase`] / [`CycleState`] — phase enumeration and run-state accounting
//! - [`clock`] — pure elapsed-time → phase location mapping
//! - [`MilestoneTracker`] — checkpoint marker spawn/retire lifecycle
//! - [`CycleEngine`] — per-tick orchestration and event production

pub mod clock;
pub mod engine;
pub mod milestone;
pub mod state;

pub use clock::{PhaseLocation, locate};
pub use engine::{CycleEngine, StopOutcome, TickFrame};
pub use milestone::{Checkpoint, Marker, MarkerDelta, MarkerId, MarkerKey, MilestoneTracker};
pub use state::{CycleState, Phase};
