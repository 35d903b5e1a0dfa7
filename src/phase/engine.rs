//! Cycle engine orchestration
//!
//! The `CycleEngine` owns the run state, caches the triangle for the
//! current pattern, and on every tick locates the phase, positions the
//! cursor, reconciles milestone markers and produces the resulting events.
//!
//! The engine never reads a clock itself: callers pass monotonic
//! milliseconds, so any scheduler (frame interval, test harness) can
//! drive it.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::geometry::{Canvas, Point, Triangle, compute_triangle};
use crate::observability::Event;
use crate::pattern::Pattern;

use super::clock::{self, PhaseLocation};
use super::milestone::{Marker, MilestoneTracker};
use super::state::{CycleState, Phase};

/// Result of one processed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickFrame {
    /// Phase location within the current cycle.
    pub location: PhaseLocation,
    /// Cursor position on the triangle.
    pub cursor: Point,
    /// Completed cycles after this tick.
    pub cycles_completed: u64,
    /// Events produced by this tick, in emission order.
    pub events: Vec<Event>,
}

impl TickFrame {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.location.phase
    }
}

/// Result of stopping a running engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOutcome {
    /// Active time of the run that just ended.
    pub run_ms: u64,
    /// Retirement events for markers that were still active.
    pub events: Vec<Event>,
}

/// Breathing cycle engine.
///
/// Coordinates:
/// - Run state (`start` / `stop`, idempotent)
/// - Exact cycle boundaries with a single completion per boundary tick
/// - Phase-change detection (one event per transition)
/// - Milestone marker lifecycle
/// - Pattern replacement, locked while running
#[derive(Debug, Clone)]
pub struct CycleEngine {
    pattern: Pattern,
    canvas: Canvas,
    triangle: Triangle,
    tracker: MilestoneTracker,
    state: CycleState,
    last_phase: Option<Phase>,
}

impl CycleEngine {
    /// Creates an idle engine for `pattern`.
    #[must_use]
    pub fn new(pattern: Pattern, canvas: Canvas, tolerance: f64) -> Self {
        Self {
            pattern,
            canvas,
            triangle: compute_triangle(&pattern, &canvas),
            tracker: MilestoneTracker::new(pattern, tolerance),
            state: CycleState::default(),
            last_phase: None,
        }
    }

    /// Starts a fresh cycle at `now_ms`, phase Inhaling.
    ///
    /// Returns `false` without touching any state if already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state.running {
            debug!("start ignored; engine already running");
            return false;
        }

        self.state.running = true;
        self.state.cycle_start_ms = now_ms;
        self.state.run_start_ms = now_ms;
        self.state.last_tick_ms = None;
        self.last_phase = None;

        info!(
            pattern = %self.pattern,
            cycles_completed = self.state.cycles_completed,
            "cycle engine started"
        );
        true
    }

    /// Stops the engine at `now_ms`.
    ///
    /// Retires all active markers immediately and folds the run into the
    /// accumulated active time. Completed cycles and the pattern are kept.
    /// Returns `None` if the engine was not running.
    pub fn stop(&mut self, now_ms: u64) -> Option<StopOutcome> {
        if !self.state.running {
            return None;
        }

        self.state.running = false;
        let run_ms = now_ms.saturating_sub(self.state.run_start_ms);
        self.state.elapsed_before_pause_ms = self.state.elapsed_before_pause_ms.saturating_add(run_ms);
        self.state.last_tick_ms = None;
        self.last_phase = None;

        let events = retirement_events(self.tracker.retire_all());

        info!(
            run_ms,
            cycles_completed = self.state.cycles_completed,
            markers_retired = events.len(),
            "cycle engine stopped"
        );
        Some(StopOutcome { run_ms, events })
    }

    /// Processes one tick at `now_ms`.
    ///
    /// Returns `None` when the engine is idle, so a tick scheduled before
    /// a stop can never act on a stopped engine. Never fails: clock skew
    /// is clamped to zero progress.
    pub fn tick(&mut self, now_ms: u64) -> Option<TickFrame> {
        if !self.state.running {
            return None;
        }

        let mut events = Vec::new();

        if let Some(last) = self.state.last_tick_ms {
            if now_ms < last {
                warn!(now_ms, last_tick_ms = last, "monotonic clock went backwards; clamping");
            }
        }

        let cycle_ms = self.pattern.cycle_ms();
        let mut elapsed = now_ms.saturating_sub(self.state.cycle_start_ms);

        if elapsed >= cycle_ms {
            self.state.cycles_completed += 1;
            events.extend(retirement_events(self.tracker.retire_all()));
            events.push(Event::CycleCompleted {
                count: self.state.cycles_completed,
            });
            info!(count = self.state.cycles_completed, "cycle completed");

            // Restart phase tracking at the boundary; the remainder carries
            // over so the boundary stays exact.
            let remainder = elapsed % cycle_ms;
            self.state.cycle_start_ms = now_ms - remainder;
            elapsed = remainder;
            self.last_phase = None;
        }

        let location = clock::locate(elapsed, &self.pattern);
        let cursor = self
            .triangle
            .cursor_at(location.phase, location.phase_fraction);

        let delta = self
            .tracker
            .reconcile(location.phase, location.phase_fraction, cursor);
        events.extend(retirement_events(delta.retired));

        if self.last_phase != Some(location.phase) {
            debug!(phase = %location.phase, "phase changed");
            events.push(Event::PhaseChanged {
                phase: location.phase,
                edge: self.triangle.edge(location.phase).path(),
            });
            self.last_phase = Some(location.phase);
        }

        events.extend(delta.spawned.into_iter().map(|m| Event::MarkerSpawned {
            id: m.id,
            phase: m.key.phase,
            checkpoint: m.key.checkpoint,
            x: m.position.x,
            y: m.position.y,
        }));

        self.state.last_tick_ms = Some(now_ms.max(self.state.last_tick_ms.unwrap_or(0)));

        Some(TickFrame {
            location,
            cursor,
            cycles_completed: self.state.cycles_completed,
            events,
        })
    }

    /// Replaces the pattern, recomputing the triangle and clearing markers.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PatternLocked` while running; the current
    /// pattern is kept.
    pub fn set_pattern(&mut self, pattern: Pattern) -> Result<Vec<Event>, EngineError> {
        if self.state.running {
            warn!(requested = %pattern, current = %self.pattern, "pattern change rejected while running");
            return Err(EngineError::PatternLocked { state: "running" });
        }

        self.pattern = pattern;
        self.triangle = compute_triangle(&pattern, &self.canvas);
        self.last_phase = None;
        let retired = self.tracker.set_pattern(pattern);
        info!(%pattern, "breathing pattern selected");
        Ok(retirement_events(retired))
    }

    /// Whether ticks are being processed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Completed cycles across all runs.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.state.cycles_completed
    }

    /// Current pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Triangle for the current pattern.
    #[must_use]
    pub const fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Phase observed at the last tick of the current cycle.
    #[must_use]
    pub const fn current_phase(&self) -> Option<Phase> {
        self.last_phase
    }

    /// Snapshot of the run state.
    #[must_use]
    pub const fn state(&self) -> &CycleState {
        &self.state
    }

    /// Currently active markers.
    pub fn active_markers(&self) -> impl Iterator<Item = &Marker> {
        self.tracker.active()
    }
}

fn retirement_events(markers: Vec<Marker>) -> Vec<Event> {
    markers
        .into_iter()
        .map(|m| Event::MarkerRetired { id: m.id })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::milestone::{Checkpoint, DEFAULT_TOLERANCE};

    fn engine(a: f64, b: f64, c: f64) -> CycleEngine {
        CycleEngine::new(
            Pattern::new(a, b, c).unwrap(),
            Canvas::default(),
            DEFAULT_TOLERANCE,
        )
    }

    fn phase_changes(events: &[Event]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn idle_engine_ignores_ticks() {
        let mut e = engine(4.0, 7.0, 8.0);
        assert!(e.tick(1_000).is_none());
        assert!(!e.is_running());
    }

    #[test]
    fn start_is_idempotent() {
        let mut e = engine(4.0, 7.0, 8.0);
        assert!(e.start(100));
        let before = *e.state();
        assert!(!e.start(5_000));
        assert_eq!(*e.state(), before);
    }

    #[test]
    fn first_tick_announces_inhaling() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        let frame = e.tick(0).unwrap();
        assert_eq!(frame.phase(), Phase::Inhaling);
        assert_eq!(frame.cursor, e.triangle().base);
        assert_eq!(phase_changes(&frame.events), [Phase::Inhaling]);

        let frame = e.tick(16).unwrap();
        assert!(phase_changes(&frame.events).is_empty());
    }

    #[test]
    fn marker_spawns_at_mid_inhale() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        e.tick(0);
        let frame = e.tick(2_000).unwrap();
        let spawned: Vec<Checkpoint> = frame
            .events
            .iter()
            .filter_map(|ev| match ev {
                Event::MarkerSpawned { checkpoint, .. } => Some(*checkpoint),
                _ => None,
            })
            .collect();
        assert_eq!(spawned, [Checkpoint::from_hundredths(50)]);
        assert_eq!(e.active_markers().count(), 1);
    }

    #[test]
    fn phase_changes_once_per_transition_in_order() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        let mut seen = Vec::new();
        for now in (0..19_000).step_by(16) {
            seen.extend(phase_changes(&e.tick(now).unwrap().events));
        }
        assert_eq!(seen, [Phase::Inhaling, Phase::Holding, Phase::Exhaling]);
    }

    #[test]
    fn cycle_boundary_completes_once_and_carries_remainder() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        e.tick(0);
        e.tick(2_000);
        assert_eq!(e.active_markers().count(), 1);

        let frame = e.tick(19_500).unwrap();
        assert_eq!(frame.cycles_completed, 1);
        assert_eq!(frame.phase(), Phase::Inhaling);
        assert!((frame.location.phase_fraction - 0.125).abs() < 1e-9);
        assert!(frame.events.contains(&Event::CycleCompleted { count: 1 }));
        assert!(
            frame
                .events
                .iter()
                .any(|ev| matches!(ev, Event::MarkerRetired { .. }))
        );
        assert_eq!(e.state().cycle_start_ms, 19_000);
    }

    #[test]
    fn long_gap_completes_a_single_cycle() {
        let mut e = engine(2.0, 4.0, 4.0);
        e.start(0);
        e.tick(0);
        let frame = e.tick(95_000).unwrap();
        assert_eq!(frame.cycles_completed, 1);
        assert_eq!(e.cycles_completed(), 1);
    }

    #[test]
    fn stop_retires_markers_and_keeps_cycles() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        e.tick(0);
        e.tick(19_100);
        e.tick(21_000);
        assert_eq!(e.active_markers().count(), 1);

        let outcome = e.stop(24_000).unwrap();
        assert_eq!(outcome.run_ms, 24_000);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(e.active_markers().count(), 0);
        assert_eq!(e.cycles_completed(), 1);
        assert!(e.stop(25_000).is_none());
    }

    #[test]
    fn restart_begins_fresh_cycle() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        e.tick(5_000);
        e.stop(5_000);

        e.start(60_000);
        let frame = e.tick(60_000).unwrap();
        assert_eq!(frame.phase(), Phase::Inhaling);
        assert_eq!(frame.location.cycle_fraction, 0.0);
        assert_eq!(e.cycles_completed(), 0);
        assert_eq!(e.state().elapsed_before_pause_ms, 5_000);
    }

    #[test]
    fn backwards_clock_clamps_to_zero_progress() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(10_000);
        let frame = e.tick(9_000).unwrap();
        assert_eq!(frame.location.cycle_fraction, 0.0);
        assert_eq!(frame.phase(), Phase::Inhaling);
    }

    #[test]
    fn pattern_locked_while_running() {
        let mut e = engine(4.0, 7.0, 8.0);
        e.start(0);
        let err = e.set_pattern(Pattern::new(2.0, 4.0, 4.0).unwrap()).unwrap_err();
        assert_eq!(err, EngineError::PatternLocked { state: "running" });
        assert_eq!(*e.pattern(), Pattern::new(4.0, 7.0, 8.0).unwrap());
    }

    #[test]
    fn pattern_change_recomputes_triangle() {
        let mut e = engine(4.0, 7.0, 8.0);
        let before = e.triangle().clone();
        e.set_pattern(Pattern::new(2.0, 4.0, 4.0).unwrap()).unwrap();
        assert_ne!(*e.triangle(), before);
        assert_eq!(
            *e.triangle(),
            compute_triangle(&Pattern::new(2.0, 4.0, 4.0).unwrap(), &Canvas::default())
        );
    }
}
