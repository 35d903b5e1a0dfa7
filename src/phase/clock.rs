//! Elapsed time → phase location
//!
//! Pure mapping from milliseconds into the cycle onto the current phase
//! and the progress within it. Cycle completion is not detected here:
//! the caller compares elapsed time against [`Pattern::cycle_ms`] so the
//! boundary's side effects stay in one place.

use serde::Serialize;

use crate::pattern::Pattern;

use super::state::Phase;

/// Largest `f64` strictly below 1.0; fractions are clamped into `[0, 1)`.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Where in the cycle a given elapsed time falls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseLocation {
    /// Current phase.
    pub phase: Phase,
    /// Progress within the phase, in `[0, 1)`.
    pub phase_fraction: f64,
    /// Progress within the whole cycle, in `[0, 1)`.
    pub cycle_fraction: f64,
}

/// Locates `elapsed_ms` within a cycle of `pattern`.
///
/// Elapsed values past the cycle length wrap around.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn locate(elapsed_ms: u64, pattern: &Pattern) -> PhaseLocation {
    let total_ms = pattern.cycle_ms();
    let cycle_fraction = clamp_fraction((elapsed_ms % total_ms) as f64 / total_ms as f64);

    let total = pattern.total_seconds();
    let inhale_end = pattern.inhale() / total;
    let hold_end = (pattern.inhale() + pattern.hold()) / total;

    let (phase, phase_fraction) = if cycle_fraction < inhale_end {
        (Phase::Inhaling, cycle_fraction / inhale_end)
    } else if cycle_fraction < hold_end {
        (
            Phase::Holding,
            (cycle_fraction - inhale_end) / (hold_end - inhale_end),
        )
    } else {
        (
            Phase::Exhaling,
            (cycle_fraction - hold_end) / (1.0 - hold_end),
        )
    };

    PhaseLocation {
        phase,
        phase_fraction: clamp_fraction(phase_fraction),
        cycle_fraction,
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, BELOW_ONE)
}
