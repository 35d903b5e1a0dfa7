//! Breathing session
//!
//! A [`Session`] is the explicit owner of everything one user session
//! needs: the cycle engine, the session timer, the countdown, the selected
//! level and the event subscribers. Presentation layers talk to it through
//! intents (`start`, `stop`, `change_pattern`, `select_level`,
//! `visibility_changed`) and receive [`Event`]s back over channels.
//!
//! All operations take monotonic milliseconds from the caller, so the
//! session itself never reads a clock.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{self, Level};
use crate::config::{Preferences, SessionConfig};
use crate::error::EngineError;
use crate::geometry::Triangle;
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter, StopReason};
use crate::pattern::Pattern;
use crate::phase::{CycleEngine, Phase, TickFrame};
use crate::timer::SessionTimer;

/// Length of one countdown step.
const COUNTDOWN_STEP_MS: u64 = 1_000;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing running; pattern changes allowed.
    Idle,
    /// Counting down before the first cycle.
    CountingDown {
        /// Seconds left, as last announced.
        remaining: u32,
        /// When the next countdown step is due.
        next_step_ms: u64,
    },
    /// The cycle engine is running.
    Running,
}

impl SessionState {
    /// Short description used in errors and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CountingDown { .. } => "counting down",
            Self::Running => "running",
        }
    }
}

/// A breathing session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    engine: CycleEngine,
    timer: SessionTimer,
    state: SessionState,
    level: Option<Level>,
    subscribers: Vec<mpsc::UnboundedSender<Event>>,
    emitter: Option<Arc<EventEmitter>>,
    last_frame_ms: Option<u64>,
    gauge_phase: Option<Phase>,
    last_stop_reason: Option<StopReason>,
}

impl Session {
    /// Creates an idle session breathing `pattern`.
    #[must_use]
    pub fn new(config: SessionConfig, pattern: Pattern) -> Self {
        let engine = CycleEngine::new(pattern, config.canvas, config.milestones.tolerance);
        Self {
            id: Uuid::new_v4(),
            config,
            engine,
            timer: SessionTimer::new(),
            state: SessionState::Idle,
            level: catalog::level_for(&pattern),
            subscribers: Vec::new(),
            emitter: None,
            last_frame_ms: None,
            gauge_phase: None,
            last_stop_reason: None,
        }
    }

    /// Creates an idle session for the stored preferences.
    #[must_use]
    pub fn from_preferences(config: SessionConfig, prefs: &Preferences) -> Self {
        let mut session = Self::new(config, prefs.effective_pattern());
        if prefs.pattern.is_none() {
            session.level = Some(prefs.mode);
        }
        session
    }

    /// Also writes every event to `emitter`.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Registers a new event subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Starts the session at `now_ms`.
    ///
    /// Enters the countdown, or starts the engine directly when the
    /// countdown is disabled. Returns `false` if not idle.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state != SessionState::Idle {
            debug!(state = self.state.as_str(), "start ignored");
            return false;
        }

        let countdown = self.config.timing.countdown_secs;
        if countdown == 0 {
            self.begin_running(now_ms);
        } else {
            self.state = SessionState::CountingDown {
                remaining: countdown,
                next_step_ms: now_ms + COUNTDOWN_STEP_MS,
            };
            self.last_frame_ms = Some(now_ms);
            info!(session_id = %self.id, seconds = countdown, "countdown started");
            self.publish(&Event::CountdownTick {
                remaining: countdown,
            });
        }
        true
    }

    /// Stops the session at `now_ms`. Returns `false` if already idle.
    pub fn stop(&mut self, now_ms: u64) -> bool {
        self.halt(now_ms, StopReason::User)
    }

    /// Stops the session as of `at_ms` for `reason`.
    ///
    /// A countdown is cancelled without starting anything. A running
    /// engine is stopped, its markers retired and the run folded into the
    /// session timer up to `at_ms`.
    pub fn halt(&mut self, at_ms: u64, reason: StopReason) -> bool {
        match self.state {
            SessionState::Idle => return false,
            SessionState::CountingDown { .. } => {
                info!(session_id = %self.id, %reason, "countdown cancelled");
            }
            SessionState::Running => {
                if let Some(outcome) = self.engine.stop(at_ms) {
                    for event in &outcome.events {
                        self.publish(event);
                    }
                }
                self.timer.stop_at(at_ms);
                metrics::set_current_phase(None, self.gauge_phase.take());
            }
        }

        self.state = SessionState::Idle;
        self.last_frame_ms = None;
        self.last_stop_reason = Some(reason);

        let total_elapsed_ms = self.timer.total_ms(at_ms);
        info!(
            session_id = %self.id,
            %reason,
            cycles_completed = self.engine.cycles_completed(),
            total_elapsed_ms,
            "session stopped"
        );
        metrics::record_session_stopped(reason);
        self.publish(&Event::SessionStopped {
            reason,
            cycles_completed: self.engine.cycles_completed(),
            total_elapsed_ms,
        });
        true
    }

    /// Reacts to the view being hidden or shown.
    ///
    /// Hiding stops the session immediately; showing does not resume it.
    pub fn visibility_changed(&mut self, hidden: bool, now_ms: u64) -> bool {
        if hidden {
            self.halt(now_ms, StopReason::Hidden)
        } else {
            false
        }
    }

    /// Replaces the pattern.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PatternLocked` unless the session is idle.
    pub fn change_pattern(&mut self, pattern: Pattern) -> Result<(), EngineError> {
        if self.state != SessionState::Idle {
            warn!(state = self.state.as_str(), requested = %pattern, "pattern change rejected");
            return Err(EngineError::PatternLocked {
                state: self.state.as_str(),
            });
        }
        for event in self.engine.set_pattern(pattern)? {
            self.publish(&event);
        }
        self.level = catalog::level_for(&pattern);
        Ok(())
    }

    /// Selects a difficulty level and its preset pattern.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PatternLocked` unless the session is idle.
    pub fn select_level(&mut self, level: Level) -> Result<(), EngineError> {
        self.change_pattern(level.pattern())?;
        self.level = Some(level);
        Ok(())
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Processes one frame at `now_ms`.
    ///
    /// Advances the countdown or the engine. If the previous frame is more
    /// than `max_tick_gap_ms` old, the session is halted as of that frame
    /// with [`StopReason::Stalled`] and nothing is advanced.
    pub fn tick(&mut self, now_ms: u64) -> Option<TickFrame> {
        if self.state == SessionState::Idle {
            return None;
        }

        if let Some(last) = self.last_frame_ms {
            let gap = now_ms.saturating_sub(last);
            if gap > self.config.timing.max_tick_gap_ms {
                warn!(
                    gap_ms = gap,
                    max_gap_ms = self.config.timing.max_tick_gap_ms,
                    state = self.state.as_str(),
                    "frames stalled; stopping at last delivered frame"
                );
                self.halt(last, StopReason::Stalled);
                return None;
            }
        }

        if matches!(self.state, SessionState::CountingDown { .. }) {
            self.last_frame_ms = Some(self.last_frame_ms.map_or(now_ms, |last| last.max(now_ms)));
            self.advance_countdown(now_ms);
            if self.state != SessionState::Running {
                return None;
            }
        }

        let frame = self.engine.tick(now_ms)?;
        self.last_frame_ms = Some(self.last_frame_ms.map_or(now_ms, |last| last.max(now_ms)));
        for event in &frame.events {
            self.record(event);
            self.publish(event);
        }
        Some(frame)
    }

    /// Publishes the current timer display and returns it.
    ///
    /// Read-only with respect to session state.
    pub fn timer_tick(&self, now_ms: u64) -> String {
        let display = self.timer.display_value(now_ms);
        metrics::set_session_elapsed(std::time::Duration::from_millis(
            self.timer.total_ms(now_ms),
        ));
        self.publish(&Event::TimerTick {
            display: display.clone(),
        });
        display
    }

    fn advance_countdown(&mut self, now_ms: u64) {
        while let SessionState::CountingDown {
            remaining,
            next_step_ms,
        } = self.state
        {
            if now_ms < next_step_ms {
                return;
            }
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.begin_running(next_step_ms);
                return;
            }
            self.state = SessionState::CountingDown {
                remaining,
                next_step_ms: next_step_ms + COUNTDOWN_STEP_MS,
            };
            self.publish(&Event::CountdownTick { remaining });
        }
    }

    fn begin_running(&mut self, at_ms: u64) {
        self.engine.start(at_ms);
        self.timer.start(at_ms);
        self.state = SessionState::Running;
        self.last_frame_ms = Some(at_ms);
        self.last_stop_reason = None;

        info!(session_id = %self.id, pattern = %self.engine.pattern(), "session started");
        metrics::record_session_started();
        self.publish(&Event::SessionStarted {
            session_id: self.id,
            pattern: *self.engine.pattern(),
        });
    }

    fn record(&mut self, event: &Event) {
        match event {
            Event::CycleCompleted { .. } => metrics::record_cycle_completed(),
            Event::PhaseChanged { phase, .. } => {
                metrics::record_phase_transition(*phase, self.gauge_phase.replace(*phase));
            }
            Event::MarkerSpawned { phase, .. } => metrics::record_marker_spawned(*phase),
            _ => {}
        }
    }

    fn publish(&self, event: &Event) {
        for tx in &self.subscribers {
            let _ = tx.send(event.clone());
        }
        if let Some(emitter) = &self.emitter {
            emitter.emit(event);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is counting down or running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The cycle engine.
    #[must_use]
    pub const fn engine(&self) -> &CycleEngine {
        &self.engine
    }

    /// Triangle for the current pattern.
    #[must_use]
    pub const fn triangle(&self) -> &Triangle {
        self.engine.triangle()
    }

    /// Current pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        self.engine.pattern()
    }

    /// Selected level, `None` for a custom pattern.
    #[must_use]
    pub const fn level(&self) -> Option<Level> {
        self.level
    }

    /// Completed cycles across all runs.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.engine.cycles_completed()
    }

    /// Accumulated active time at `now_ms`.
    #[must_use]
    pub fn total_ms(&self, now_ms: u64) -> u64 {
        self.timer.total_ms(now_ms)
    }

    /// Accumulated active time at `now_ms` as `MM:SS`.
    #[must_use]
    pub fn display_value(&self, now_ms: u64) -> String {
        self.timer.display_value(now_ms)
    }

    /// Why the session last stopped, if it has.
    #[must_use]
    pub const fn last_stop_reason(&self) -> Option<StopReason> {
        self.last_stop_reason
    }
}
