//! `patterns` command handler
//!
//! Prints the built-in catalog in human or JSON format.

use serde::Serialize;

use crate::catalog::{self, Level};
use crate::cli::args::{OutputFormat, PatternsArgs};
use crate::error::VagueError;

#[derive(Debug, Serialize)]
struct PatternRow {
    level: Level,
    inhale: f64,
    hold: f64,
    exhale: f64,
    cycle_seconds: f64,
    breaths_per_minute: f64,
}

fn rows() -> Vec<PatternRow> {
    catalog::presets()
        .iter()
        .map(|preset| PatternRow {
            level: preset.level,
            inhale: preset.pattern.inhale(),
            hold: preset.pattern.hold(),
            exhale: preset.pattern.exhale(),
            cycle_seconds: preset.pattern.total_seconds(),
            breaths_per_minute: preset.pattern.breaths_per_minute(),
        })
        .collect()
}

/// Print the pattern catalog.
///
/// # Errors
///
/// Returns `VagueError::Json` if JSON encoding fails.
pub fn run(args: &PatternsArgs) -> Result<(), VagueError> {
    match args.format {
        OutputFormat::Human => print!("{}", render_human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows())?),
    }
    Ok(())
}

fn render_human() -> String {
    let default = Level::default();
    rows()
        .iter()
        .map(|row| {
            let marker = if row.level == default { " (default)" } else { "" };
            format!(
                "{:<8} {}-{}-{}  cycle {}s, {:.1} breaths/min{marker}\n",
                row.level.as_str(),
                row.inhale,
                row.hold,
                row.exhale,
                row.cycle_seconds,
                row.breaths_per_minute
            )
        })
        .collect()
}
