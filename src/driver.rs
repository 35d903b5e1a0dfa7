//! Tick scheduling
//!
//! The [`Driver`] feeds a [`Session`] from tokio intervals: one at frame
//! rate for the engine and one at display rate for the timer readout.
//! It stops when the session stops on its own (stall), when a run limit
//! is reached, or when [`Shutdown`] is triggered.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::observability::StopReason;
use crate::session::Session;
use crate::time::Clock;

/// Shutdown request shared between signal handlers and the driver.
///
/// The first trigger wins; later reasons are ignored.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl Shutdown {
    /// Creates an untriggered shutdown handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown for `reason`.
    pub fn trigger(&self, reason: StopReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for a shutdown request and returns its reason.
    pub async fn wait(&self) -> StopReason {
        self.token.cancelled().await;
        self.reason.get().copied().unwrap_or(StopReason::Interrupted)
    }
}

/// Optional limits that end a run with [`StopReason::Completed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop once this many cycles have completed.
    pub max_cycles: Option<u64>,
    /// Stop once this much active time has accumulated.
    pub max_duration: Option<Duration>,
}

impl RunLimits {
    /// Whether `session` has reached any limit at `now_ms`.
    #[must_use]
    pub fn reached(&self, session: &Session, now_ms: u64) -> bool {
        let cycles = self
            .max_cycles
            .is_some_and(|max| session.cycles_completed() >= max);
        let duration = self
            .max_duration
            .is_some_and(|max| u128::from(session.total_ms(now_ms)) >= max.as_millis());
        cycles || duration
    }
}

/// Interval-based session driver.
#[derive(Debug)]
pub struct Driver<C: Clock> {
    clock: C,
    limits: RunLimits,
    shutdown: Shutdown,
}

impl<C: Clock> Driver<C> {
    /// Creates a driver reading time from `clock`.
    #[must_use]
    pub const fn new(clock: C, limits: RunLimits, shutdown: Shutdown) -> Self {
        Self {
            clock,
            limits,
            shutdown,
        }
    }

    /// The clock ticks are stamped with.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Starts `session` if it is idle and drives it until it stops.
    ///
    /// Returns why the run ended. The session is idle afterwards.
    pub async fn run(&self, session: &mut Session) -> StopReason {
        let timing = session.config().timing;

        let mut frames = time::interval(timing.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut display = time::interval(timing.display_interval());
        display.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if !session.is_active() {
            session.start(self.clock.now_ms());
        }
        info!(
            session_id = %session.id(),
            frame_interval_ms = timing.frame_interval_ms,
            "driver started"
        );

        loop {
            tokio::select! {
                biased;
                reason = self.shutdown.wait() => {
                    debug!(%reason, "shutdown requested");
                    session.halt(self.clock.now_ms(), reason);
                    return reason;
                }
                _ = frames.tick() => {
                    let now = self.clock.now_ms();
                    session.tick(now);
                    if !session.is_active() {
                        return session.last_stop_reason().unwrap_or(StopReason::User);
                    }
                    if self.limits.reached(session, now) {
                        session.halt(now, StopReason::Completed);
                        return StopReason::Completed;
                    }
                }
                _ = display.tick() => {
                    session.timer_tick(self.clock.now_ms());
                }
            }
        }
    }
}
