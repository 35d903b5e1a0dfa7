//! `triangle` command handler
//!
//! Prints the geometry computed for a pattern: vertices and edges for
//! humans, the full structure as JSON, or an SVG document.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::Level;
use crate::cli::args::{TriangleArgs, TriangleFormat};
use crate::error::VagueError;
use crate::geometry::{Canvas, Triangle, compute_triangle};
use crate::pattern::Pattern;

use super::{load_session_config, resolve_pattern};

#[derive(Debug, Serialize)]
struct TriangleReport<'a> {
    pattern: Pattern,
    canvas: &'a Canvas,
    triangle: &'a Triangle,
}

/// Print the triangle for the selected pattern.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or JSON
/// encoding fails.
pub fn run(args: &TriangleArgs) -> Result<(), VagueError> {
    let config = load_session_config(args.config.as_deref())?;
    let pattern = resolve_pattern(&args.selection, Level::default().pattern());
    let triangle = compute_triangle(&pattern, &config.canvas);

    match args.format {
        TriangleFormat::Human => print!("{}", render_human(&pattern, &triangle)),
        TriangleFormat::Json => {
            let report = TriangleReport {
                pattern,
                canvas: &config.canvas,
                triangle: &triangle,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        TriangleFormat::Svg => print!("{}", triangle.to_svg(&config.canvas)),
    }
    Ok(())
}

fn render_human(pattern: &Pattern, triangle: &Triangle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "pattern   {pattern}");
    let _ = writeln!(out, "scale     {:.3}", triangle.scale);
    for (name, point) in [
        ("base", triangle.base),
        ("top-left", triangle.top_left),
        ("top-right", triangle.top_right),
    ] {
        let _ = writeln!(out, "{name:<9} ({:.1}, {:.1})", point.x, point.y);
    }
    for edge in &triangle.edges {
        let _ = writeln!(
            out,
            "{:<9} length {:.1}  {}",
            edge.phase.as_str(),
            edge.nominal_length,
            edge.path()
        );
    }
    out
}
