//! Milestone markers
//!
//! Spawns a transient marker the first time progress within a phase comes
//! within tolerance of a checkpoint, and retires markers when the phase
//! changes, the cycle restarts or the session stops.
//!
//! Markers are keyed by `(phase, checkpoint)`. Checkpoints are stored as
//! integer hundredths so keys compare exactly.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::geometry::Point;
use crate::pattern::Pattern;

use super::state::Phase;

/// Default distance from a checkpoint within which it fires.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Hold durations at or above this get the dense checkpoint set.
const HOLD_DENSE_SECS: f64 = 5.0;
/// Hold durations at or above this (and below dense) get two checkpoints.
const HOLD_SPARSE_SECS: f64 = 3.0;
/// Exhale durations at or above this get the dense checkpoint set.
const EXHALE_DENSE_SECS: f64 = 6.0;

const QUARTERS: [Checkpoint; 3] = [Checkpoint(25), Checkpoint(50), Checkpoint(75)];
const HOLD_DENSE: [Checkpoint; 4] = [Checkpoint(20), Checkpoint(40), Checkpoint(60), Checkpoint(80)];
const HOLD_SPARSE: [Checkpoint; 2] = [Checkpoint(33), Checkpoint(66)];
const EXHALE_DENSE: [Checkpoint; 5] = [
    Checkpoint(17),
    Checkpoint(33),
    Checkpoint(50),
    Checkpoint(67),
    Checkpoint(83),
];

/// Fractional position within a phase, in hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checkpoint(u8);

impl Checkpoint {
    /// Creates a checkpoint from hundredths, clamped to 100.
    #[must_use]
    pub const fn from_hundredths(hundredths: u8) -> Self {
        if hundredths > 100 {
            Self(100)
        } else {
            Self(hundredths)
        }
    }

    /// Checkpoint in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> u8 {
        self.0
    }

    /// Checkpoint as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.fraction())
    }
}

impl Serialize for Checkpoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.fraction())
    }
}

/// Checkpoints for `phase` under `pattern`.
///
/// Longer holds and exhales get denser checkpoint sets; holds shorter
/// than three seconds get none.
#[must_use]
pub fn checkpoints(phase: Phase, pattern: &Pattern) -> &'static [Checkpoint] {
    match phase {
        Phase::Inhaling => &QUARTERS,
        Phase::Holding if pattern.hold() >= HOLD_DENSE_SECS => &HOLD_DENSE,
        Phase::Holding if pattern.hold() >= HOLD_SPARSE_SECS => &HOLD_SPARSE,
        Phase::Holding => &[],
        Phase::Exhaling if pattern.exhale() >= EXHALE_DENSE_SECS => &EXHALE_DENSE,
        Phase::Exhaling => &QUARTERS,
    }
}

/// Unique identifier handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Marker identity: at most one active marker per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerKey {
    /// Phase the checkpoint belongs to.
    pub phase: Phase,
    /// Checkpoint within that phase.
    pub checkpoint: Checkpoint,
}

/// An active milestone marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    /// Presentation handle.
    pub id: MarkerId,
    /// Identity.
    pub key: MarkerKey,
    /// Cursor position when the checkpoint fired.
    pub position: Point,
}

/// Markers spawned and retired by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDelta {
    /// Newly spawned markers.
    pub spawned: Vec<Marker>,
    /// Markers removed from the active set.
    pub retired: Vec<Marker>,
}

impl MarkerDelta {
    /// True when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.retired.is_empty()
    }
}

/// Tracks the active marker set and the checkpoints already fired during
/// the current phase visit.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    pattern: Pattern,
    tolerance: f64,
    active: BTreeMap<MarkerKey, Marker>,
    fired: BTreeSet<MarkerKey>,
    visiting: Option<Phase>,
    next_id: u64,
}

impl MilestoneTracker {
    /// Creates a tracker for `pattern` with the given checkpoint tolerance.
    #[must_use]
    pub const fn new(pattern: Pattern, tolerance: f64) -> Self {
        Self {
            pattern,
            tolerance,
            active: BTreeMap::new(),
            fired: BTreeSet::new(),
            visiting: None,
            next_id: 0,
        }
    }

    /// Replaces the pattern. All in-flight markers are retired.
    pub fn set_pattern(&mut self, pattern: Pattern) -> Vec<Marker> {
        self.pattern = pattern;
        self.retire_all()
    }

    /// Reconciles the marker set against the current progress.
    ///
    /// A phase different from the one being visited starts a new visit:
    /// markers of the previous phase are retired and its fired set is
    /// forgotten. Each checkpoint fires at most once per visit.
    pub fn reconcile(&mut self, phase: Phase, phase_fraction: f64, position: Point) -> MarkerDelta {
        let mut delta = MarkerDelta::default();

        if self.visiting != Some(phase) {
            if let Some(previous) = self.visiting {
                delta.retired = self.retire_phase(previous);
            }
            self.fired.clear();
            self.visiting = Some(phase);
        }

        for &checkpoint in checkpoints(phase, &self.pattern) {
            if (phase_fraction - checkpoint.fraction()).abs() >= self.tolerance {
                continue;
            }
            let key = MarkerKey { phase, checkpoint };
            if !self.fired.insert(key) {
                continue;
            }
            if let Entry::Vacant(slot) = self.active.entry(key) {
                let marker = Marker {
                    id: MarkerId(self.next_id),
                    key,
                    position,
                };
                self.next_id += 1;
                trace!(id = %marker.id, %phase, %checkpoint, "marker spawned");
                slot.insert(marker);
                delta.spawned.push(marker);
            }
        }

        delta
    }

    /// Retires every active marker and ends the current visit.
    pub fn retire_all(&mut self) -> Vec<Marker> {
        self.fired.clear();
        self.visiting = None;
        std::mem::take(&mut self.active).into_values().collect()
    }

    fn retire_phase(&mut self, phase: Phase) -> Vec<Marker> {
        let keys: Vec<MarkerKey> = self
            .active
            .keys()
            .filter(|k| k.phase == phase)
            .copied()
            .collect();
        keys.iter()
            .filter_map(|k| self.active.remove(k))
            .collect()
    }

    /// Currently active markers, ordered by key.
    pub fn active(&self) -> impl Iterator<Item = &Marker> {
        self.active.values()
    }

    /// Number of active markers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
