//! CLI argument definitions
//!
//! All Clap derive structs for `vague` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::catalog::Level;
use crate::localization::Language;
use crate::pattern::Pattern;

// ============================================================================
// Root CLI
// ============================================================================

/// Guided triangle breathing in the terminal.
#[derive(Parser, Debug)]
#[command(name = "vague", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "VAGUE_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "VAGUE_LOG_FORMAT")]
    pub log_format: LogFormatArg,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a guided breathing session.
    Run(RunArgs),

    /// List the built-in breathing patterns.
    Patterns(PatternsArgs),

    /// Print the triangle geometry for a pattern.
    Triangle(TriangleArgs),

    /// Show or change stored preferences.
    Prefs(PrefsCommand),
}

// ============================================================================
// Run Command
// ============================================================================

/// Pattern selection shared by commands that breathe or draw.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct PatternSelection {
    /// Difficulty level (newbie, medium, expert).
    #[arg(short, long)]
    pub level: Option<Level>,

    /// Custom pattern as inhale-hold-exhale seconds, e.g. 4-7-8.
    #[arg(short, long)]
    pub pattern: Option<Pattern>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pattern to breathe; defaults to the stored preference.
    #[command(flatten)]
    pub selection: PatternSelection,

    /// Path to a YAML session configuration file.
    #[arg(short, long, env = "VAGUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Preference file; defaults to the per-user location.
    #[arg(long, env = "VAGUE_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Stop after this many cycles.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: Option<u64>,

    /// Stop after this much breathing time (e.g. 90s, 5m).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Write the JSONL event stream to FILE, or `-` for stdout.
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Expose Prometheus metrics on 127.0.0.1:PORT.
    #[arg(long, env = "VAGUE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Start breathing immediately, without the countdown.
    #[arg(long)]
    pub no_countdown: bool,

    /// Interface language; defaults to the stored preference.
    #[arg(long)]
    pub language: Option<Language>,
}

// ============================================================================
// Patterns / Triangle Commands
// ============================================================================

/// Arguments for `patterns`.
#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `triangle`.
#[derive(Args, Debug)]
pub struct TriangleArgs {
    /// Pattern to draw; defaults to expert.
    #[command(flatten)]
    pub selection: PatternSelection,

    /// Path to a YAML session configuration file (for the canvas).
    #[arg(short, long, env = "VAGUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: TriangleFormat,
}

// ============================================================================
// Prefs Command
// ============================================================================

/// Preference management commands.
#[derive(Args, Debug)]
pub struct PrefsCommand {
    /// Preference file; defaults to the per-user location.
    #[arg(long, global = true, env = "VAGUE_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Prefs subcommand.
    #[command(subcommand)]
    pub subcommand: PrefsSubcommand,
}

/// Prefs subcommands.
#[derive(Subcommand, Debug)]
pub enum PrefsSubcommand {
    /// Print the stored preferences.
    Show(PrefsShowArgs),

    /// Update stored preferences.
    Set(PrefsSetArgs),
}

/// Arguments for `prefs show`.
#[derive(Args, Debug)]
pub struct PrefsShowArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `prefs set`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("changes").required(true).multiple(true))]
pub struct PrefsSetArgs {
    /// Difficulty level (newbie, medium, expert).
    #[arg(short, long, group = "changes")]
    pub level: Option<Level>,

    /// Interface language (fr, en).
    #[arg(long, group = "changes")]
    pub language: Option<Language>,

    /// Custom pattern overriding the level, e.g. 5-5-5.
    #[arg(short, long, group = "changes", conflicts_with = "clear_pattern")]
    pub pattern: Option<Pattern>,

    /// Remove the custom pattern and use the level preset again.
    #[arg(long, group = "changes")]
    pub clear_pattern: bool,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Log format choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Output format for `triangle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TriangleFormat {
    /// Human-readable vertex listing.
    #[default]
    Human,
    /// JSON geometry.
    Json,
    /// Standalone SVG document.
    Svg,
}

// ============================================================================
// Tests
// ============================================================================
