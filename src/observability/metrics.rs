//! Metrics collection for `vague`.
//!
//! Prometheus-compatible metrics for breathing sessions. Phase labels come
//! from the closed [`Phase`] enum and stop reasons from [`StopReason`], so
//! label cardinality is bounded without further sanitizing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::VagueError;
use crate::phase::Phase;

use super::events::StopReason;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `VagueError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), VagueError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| VagueError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "vague_cycles_completed_total",
        "Total number of completed breathing cycles"
    );
    describe_counter!(
        "vague_phase_transitions_total",
        "Total number of phase transitions"
    );
    describe_gauge!(
        "vague_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!(
        "vague_markers_spawned_total",
        "Total number of milestone markers spawned"
    );
    describe_counter!("vague_sessions_started_total", "Sessions started");
    describe_counter!(
        "vague_sessions_stopped_total",
        "Sessions stopped by reason"
    );
    describe_gauge!(
        "vague_session_elapsed_seconds",
        "Accumulated active session time in seconds"
    );
}

/// Records a completed cycle.
pub fn record_cycle_completed() {
    counter!("vague_cycles_completed_total").increment(1);
}

/// Records a phase transition and moves the current-phase gauge.
pub fn record_phase_transition(to: Phase, from: Option<Phase>) {
    counter!("vague_phase_transitions_total", "to" => to.as_str()).increment(1);
    set_current_phase(Some(to), from);
}

/// Sets the current phase gauge.
///
/// Zeros out the previous phase label (if any) before setting the new one,
/// preventing stale labels from showing `1.0` in Prometheus. `None` clears
/// only the previous label (engine stopped).
pub fn set_current_phase(phase: Option<Phase>, previous: Option<Phase>) {
    if let Some(prev) = previous {
        gauge!("vague_current_phase", "phase" => prev.as_str()).set(0.0);
    }
    if let Some(phase) = phase {
        gauge!("vague_current_phase", "phase" => phase.as_str()).set(1.0);
    }
}

/// Records a spawned milestone marker.
pub fn record_marker_spawned(phase: Phase) {
    counter!("vague_markers_spawned_total", "phase" => phase.as_str()).increment(1);
}

/// Records a session start.
pub fn record_session_started() {
    counter!("vague_sessions_started_total").increment(1);
}

/// Records a session stop.
pub fn record_session_stopped(reason: StopReason) {
    counter!("vague_sessions_stopped_total", "reason" => reason.as_str()).increment(1);
}

/// Sets the accumulated session time gauge.
pub fn set_session_elapsed(elapsed: Duration) {
    gauge!("vague_session_elapsed_seconds").set(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_cycle_completed();
        record_phase_transition(Phase::Holding, Some(Phase::Inhaling));
        set_current_phase(None, Some(Phase::Holding));
        record_marker_spawned(Phase::Exhaling);
        record_session_started();
        record_session_stopped(StopReason::User);
        set_session_elapsed(Duration::from_secs(90));
    }
}
