//! Logging initialization for `vague`.
//!
//! Logs go to stderr through `tracing`, as human-readable lines or JSON.
//! Verbosity flags raise the `vague` target only; `VAGUE_LOG_LEVEL`
//! replaces the whole filter. The ANSI decision made here is shared with
//! the terminal presenter, whose live view redraws with escape codes.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "VAGUE_LOG_LEVEL";

/// Log output format.
///
/// Controls how log messages are rendered to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter used when `VAGUE_LOG_LEVEL` is unset.
///
/// Dependencies stay at `warn` whatever the verbosity, so `-vvv` traces
/// frames and markers without the metrics exporter's HTTP stack.
#[must_use]
pub fn default_filter(verbosity: u8) -> String {
    match verbosity {
        0 => verbosity_to_directive(0).to_owned(),
        n => format!("warn,vague={}", verbosity_to_directive(n)),
    }
}

/// Whether ANSI escapes may be written to a stream.
///
/// `Auto` requires a terminal and an unset `NO_COLOR`.
#[must_use]
pub fn ansi_enabled(color: ColorChoice, is_terminal: bool) -> bool {
    match color {
        ColorChoice::Auto => is_terminal && std::env::var_os("NO_COLOR").is_none(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Initializes the global tracing subscriber.
///
/// If `VAGUE_LOG_LEVEL` is set it takes precedence over `verbosity`.
/// Logs always go to stderr so the terminal view and a `--events -`
/// stream on stdout stay clean.
///
/// Uses `try_init()` so calling this more than once (e.g. in tests) is safe.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let show_target = verbosity >= 2;
    let use_ansi = ansi_enabled(color, std::io::stderr().is_terminal());

    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
