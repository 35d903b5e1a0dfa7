//! Structured event stream for `vague`.
//!
//! Discrete, typed events produced by the cycle engine and the session.
//! The same values are delivered to in-process subscribers over channels
//! and, optionally, serialized as newline-delimited JSON (JSONL) with a
//! monotonically increasing sequence number and a wall-clock timestamp.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pattern::Pattern;
use crate::phase::{Checkpoint, MarkerId, Phase};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Explicit stop intent.
    User,
    /// The view became hidden.
    Hidden,
    /// Frames stopped arriving for longer than the allowed gap.
    Stalled,
    /// Requested cycle count or duration reached.
    Completed,
    /// Interrupted by SIGINT.
    Interrupted,
    /// Terminated by SIGTERM.
    Terminated,
}

impl StopReason {
    /// Stable identifier, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Hidden => "hidden",
            Self::Stalled => "stalled",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a breathing session.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The cursor entered a new phase.
    PhaseChanged {
        /// Phase that was entered.
        phase: Phase,
        /// SVG path data of the edge to highlight.
        edge: String,
    },

    /// A full inhale → hold → exhale traversal finished.
    CycleCompleted {
        /// Completed cycles so far.
        count: u64,
    },

    /// A milestone marker appeared.
    MarkerSpawned {
        /// Handle for later retirement.
        id: MarkerId,
        /// Phase the checkpoint belongs to.
        phase: Phase,
        /// Checkpoint fraction within the phase.
        checkpoint: Checkpoint,
        /// Horizontal cursor position when it fired.
        x: f64,
        /// Vertical cursor position when it fired.
        y: f64,
    },

    /// A milestone marker should be removed.
    MarkerRetired {
        /// Handle from the matching spawn.
        id: MarkerId,
    },

    /// Periodic session time display.
    TimerTick {
        /// Accumulated active time as `MM:SS`.
        display: String,
    },

    /// One second of the pre-start countdown elapsed.
    CountdownTick {
        /// Seconds left before the cycle starts.
        remaining: u32,
    },

    /// The cycle engine started.
    SessionStarted {
        /// Session identifier.
        session_id: Uuid,
        /// Pattern in effect.
        pattern: Pattern,
    },

    /// The session stopped.
    SessionStopped {
        /// Why it stopped.
        reason: StopReason,
        /// Completed cycles across all runs.
        cycles_completed: u64,
        /// Accumulated active time.
        total_elapsed_ms: u64,
    },
}

impl Event {
    /// Variant name, as used in the `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "PhaseChanged",
            Self::CycleCompleted { .. } => "CycleCompleted",
            Self::MarkerSpawned { .. } => "MarkerSpawned",
            Self::MarkerRetired { .. } => "MarkerRetired",
            Self::TimerTick { .. } => "TimerTick",
            Self::CountdownTick { .. } => "CountdownTick",
            Self::SessionStarted { .. } => "SessionStarted",
            Self::SessionStopped { .. } => "SessionStopped",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number and timestamp via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a sequence number and emission time.
#[derive(Debug, Serialize)]
struct EventEnvelope<'a> {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// Wall-clock emission time.
    timestamp: DateTime<Utc>,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: &'a Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are dropped: a broken
/// event sink must never interrupt a session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: &Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            timestamp: Utc::now(),
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
