//! Phase enumeration and cycle run state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Segment of the breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Cursor travels base → top-left.
    Inhaling,
    /// Cursor travels top-left → top-right.
    Holding,
    /// Cursor travels top-right → base.
    Exhaling,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Self; 3] = [Self::Inhaling, Self::Holding, Self::Exhaling];

    /// Position of this phase within the cycle (0, 1, 2).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Inhaling => 0,
            Self::Holding => 1,
            Self::Exhaling => 2,
        }
    }

    /// Stable identifier, also the localization key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inhaling => "inhaling",
            Self::Holding => "holding",
            Self::Exhaling => "exhaling",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-state accounting owned by the cycle engine.
///
/// `running` only changes through explicit start and stop calls.
/// Timestamps are monotonic milliseconds from the session clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleState {
    /// Whether ticks are being processed.
    pub running: bool,
    /// Start of the current cycle.
    pub cycle_start_ms: u64,
    /// Start of the current run (the last `start()`).
    pub run_start_ms: u64,
    /// Active time accumulated by previous runs.
    pub elapsed_before_pause_ms: u64,
    /// Completed cycles across all runs.
    pub cycles_completed: u64,
    /// Timestamp of the last processed tick in this run.
    pub last_tick_ms: Option<u64>,
}
