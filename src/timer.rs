//! Session timer
//!
//! Accumulates active breathing time across start/stop runs and formats
//! it for display. Time only advances while a run is open.

use serde::Serialize;

/// Accumulated active session time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTimer {
    total_elapsed_ms: u64,
    current_run_start: Option<u64>,
}

impl SessionTimer {
    /// Creates a timer with no accumulated time.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_elapsed_ms: 0,
            current_run_start: None,
        }
    }

    /// Opens a run at `now_ms`. No-op if a run is already open.
    pub const fn start(&mut self, now_ms: u64) {
        if self.current_run_start.is_none() {
            self.current_run_start = Some(now_ms);
        }
    }

    /// Closes the open run as of `at_ms`, folding it into the total.
    ///
    /// Returns the run length; an `at_ms` earlier than the run start
    /// counts as zero. Stalled sessions pass the last delivered frame
    /// rather than the current time.
    pub fn stop_at(&mut self, at_ms: u64) -> u64 {
        let Some(start) = self.current_run_start.take() else {
            return 0;
        };
        let run = at_ms.saturating_sub(start);
        self.total_elapsed_ms = self.total_elapsed_ms.saturating_add(run);
        run
    }

    /// Whether a run is open.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.current_run_start.is_some()
    }

    /// Total active time at `now_ms`, including the open run.
    #[must_use]
    pub fn total_ms(&self, now_ms: u64) -> u64 {
        let open = self
            .current_run_start
            .map_or(0, |start| now_ms.saturating_sub(start));
        self.total_elapsed_ms.saturating_add(open)
    }

    /// Total active time at `now_ms` as `MM:SS`.
    #[must_use]
    pub fn display_value(&self, now_ms: u64) -> String {
        format_mm_ss(self.total_ms(now_ms))
    }
}

/// Formats milliseconds as zero-padded `MM:SS`.
///
/// Minutes keep counting past 59; there is no hour field.
#[must_use]
pub fn format_mm_ss(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{minutes:02}:{seconds:02}")
}
