//! Terminal presentation of session events
//!
//! Consumes the event stream and renders localized phase labels, the
//! cycle counter and the timer. On a terminal the status line is redrawn
//! in place; otherwise each change is printed on its own line.

use std::io::{self, Write};

use tokio::sync::mpsc;

use crate::localization::{Language, LocalizationTable};
use crate::observability::Event;
use crate::phase::Phase;

/// Clears the current terminal line.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Renders session events as text.
#[derive(Debug)]
pub struct TerminalPresenter<W: Write> {
    out: W,
    labels: &'static LocalizationTable,
    live: bool,
    phase: Option<Phase>,
    cycles: u64,
    timer: String,
}

impl<W: Write> TerminalPresenter<W> {
    /// Creates a presenter writing to `out` in `language`.
    ///
    /// `live` redraws a single status line instead of appending lines.
    pub fn new(out: W, language: Language, live: bool) -> Self {
        Self {
            out,
            labels: language.table(),
            live,
            phase: None,
            cycles: 0,
            timer: "00:00".to_owned(),
        }
    }

    /// Renders every event until the channel closes.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) -> io::Result<W> {
        while let Some(event) = events.recv().await {
            self.render(&event)?;
        }
        Ok(self.out)
    }

    /// Renders one event.
    ///
    /// # Errors
    ///
    /// Returns any write error from the underlying writer.
    pub fn render(&mut self, event: &Event) -> io::Result<()> {
        match event {
            Event::CountdownTick { remaining } => {
                if self.live {
                    write!(self.out, "{CLEAR_LINE}{remaining}")?;
                } else {
                    writeln!(self.out, "{remaining}")?;
                }
            }
            Event::SessionStarted { pattern, .. } => {
                if self.live {
                    write!(self.out, "{CLEAR_LINE}")?;
                }
                writeln!(self.out, "{} ({pattern})", self.labels.title)?;
            }
            Event::PhaseChanged { phase, .. } => {
                self.phase = Some(*phase);
                if self.live {
                    self.redraw()?;
                } else {
                    writeln!(self.out, "{}", self.labels.phase(*phase))?;
                }
            }
            Event::CycleCompleted { count } => {
                self.cycles = *count;
                if self.live {
                    self.redraw()?;
                } else {
                    writeln!(self.out, "{}: {count}", self.labels.cycles)?;
                }
            }
            Event::TimerTick { display } => {
                self.timer.clone_from(display);
                if self.live {
                    self.redraw()?;
                }
            }
            Event::SessionStopped {
                cycles_completed,
                total_elapsed_ms,
                ..
            } => {
                self.phase = None;
                if self.live {
                    write!(self.out, "{CLEAR_LINE}")?;
                }
                writeln!(
                    self.out,
                    "{} · {}: {cycles_completed} · {}",
                    self.labels.ready,
                    self.labels.cycles,
                    crate::timer::format_mm_ss(*total_elapsed_ms)
                )?;
            }
            Event::MarkerSpawned { .. } | Event::MarkerRetired { .. } => {}
        }
        self.out.flush()
    }

    fn redraw(&mut self) -> io::Result<()> {
        let label = self
            .phase
            .map_or(self.labels.ready, |phase| self.labels.phase(phase));
        write!(
            self.out,
            "{CLEAR_LINE}{label:<10} {}: {:<4} {}",
            self.labels.cycles, self.cycles, self.timer
        )
    }
}
