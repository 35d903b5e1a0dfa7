//! Triangle geometry
//!
//! Maps a [`Pattern`] onto drawable coordinates. The hold edge is the flat
//! top of the triangle and the base vertex sits centered at the bottom.
//! Edge extents are driven by a single scale factor that normalizes the
//! inhale/exhale pair to the target base width:
//!
//! ```text
//! scale = base_edge_target / sqrt(inhale² + exhale²)
//! ```
//!
//! This is a visual approximation, not a Euclidean triangle whose sides
//! equal the three durations. The nominal edge lengths (`duration · scale`)
//! keep the `inhale : hold : exhale` ratio exactly.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;
use crate::phase::Phase;

/// Drawing surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    /// Surface width.
    pub width: f64,
    /// Surface height.
    pub height: f64,
    /// Distance from the top and bottom edges to the triangle.
    pub margin: f64,
    /// Target footprint for the inhale/exhale pair.
    pub base_edge_target: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 260.0,
            margin: 30.0,
            base_edge_target: 300.0,
        }
    }
}

/// A 2D point in canvas coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation from `self` toward `to` at `t ∈ [0, 1]`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: (to.x - self.x).mul_add(t, self.x),
            y: (to.y - self.y).mul_add(t, self.y),
        }
    }
}

/// One side of the triangle, traversed during a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    /// Phase that travels along this edge.
    pub phase: Phase,
    /// Phase-start vertex.
    pub from: Point,
    /// Phase-end vertex.
    pub to: Point,
    /// `duration · scale` for this phase.
    pub nominal_length: f64,
}

impl Edge {
    /// Point at `fraction` of the way along the edge.
    #[must_use]
    pub fn point_at(&self, fraction: f64) -> Point {
        self.from.lerp(self.to, fraction.clamp(0.0, 1.0))
    }

    /// SVG path data for this edge alone (used for highlighting).
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "M {} {} L {} {}",
            self.from.x, self.from.y, self.to.x, self.to.y
        )
    }
}

/// Triangle derived from a pattern and a canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    /// Bottom vertex, where inhale starts and exhale ends.
    pub base: Point,
    /// Top-left vertex, inhale end / hold start.
    pub top_left: Point,
    /// Top-right vertex, hold end / exhale start.
    pub top_right: Point,
    /// Scale factor applied to durations.
    pub scale: f64,
    /// Inhale, hold and exhale edges in phase order.
    pub edges: [Edge; 3],
}

impl Triangle {
    /// The edge traversed during `phase`.
    #[must_use]
    pub const fn edge(&self, phase: Phase) -> &Edge {
        &self.edges[phase.index()]
    }

    /// Cursor position for `phase` at `fraction` of that phase.
    #[must_use]
    pub fn cursor_at(&self, phase: Phase, fraction: f64) -> Point {
        self.edge(phase).point_at(fraction)
    }

    /// Closed outline as SVG path data.
    #[must_use]
    pub fn outline_path(&self) -> String {
        let mut path = String::with_capacity(64);
        let _ = write!(
            path,
            "M {} {} L {} {} L {} {} Z",
            self.base.x,
            self.base.y,
            self.top_left.x,
            self.top_left.y,
            self.top_right.x,
            self.top_right.y
        );
        path
    }

    /// Renders a standalone SVG document with the outline and the three
    /// edge overlays, tagged by phase for highlighting.
    #[must_use]
    pub fn to_svg(&self, canvas: &Canvas) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
            canvas.width, canvas.height
        );
        let _ = writeln!(
            svg,
            r#"  <path id="outline" d="{}" fill="none" stroke="currentColor"/>"#,
            self.outline_path()
        );
        for edge in &self.edges {
            let _ = writeln!(
                svg,
                r#"  <path id="edge-{}" d="{}" opacity="0"/>"#,
                edge.phase.as_str(),
                edge.path()
            );
        }
        let _ = writeln!(
            svg,
            r#"  <circle id="cursor" cx="{}" cy="{}" r="6"/>"#,
            self.base.x, self.base.y
        );
        svg.push_str("</svg>\n");
        svg
    }
}

/// Computes the triangle for `pattern` on `canvas`.
///
/// Deterministic: the result depends on the pattern and canvas only.
#[must_use]
pub fn compute_triangle(pattern: &Pattern, canvas: &Canvas) -> Triangle {
    let (inhale, hold, exhale) = (pattern.inhale(), pattern.hold(), pattern.exhale());

    // Pattern durations are positive, so the hypotenuse is never zero.
    let scale = canvas.base_edge_target / inhale.hypot(exhale);
    let hold_width = hold * scale;

    let base_y = canvas.height - canvas.margin;
    let top_y = canvas.margin;

    let start_x = (canvas.width - hold_width) / 2.0;
    let top_left = Point::new(start_x, top_y);
    let top_right = Point::new(start_x + hold_width, top_y);
    let base = Point::new(start_x + hold_width / 2.0, base_y);

    let edges = [
        Edge {
            phase: Phase::Inhaling,
            from: base,
            to: top_left,
            nominal_length: inhale * scale,
        },
        Edge {
            phase: Phase::Holding,
            from: top_left,
            to: top_right,
            nominal_length: hold_width,
        },
        Edge {
            phase: Phase::Exhaling,
            from: top_right,
            to: base,
            nominal_length: exhale * scale,
        },
    ];

    Triangle {
        base,
        top_left,
        top_right,
        scale,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expert() -> Pattern {
        Pattern::new(4.0, 7.0, 8.0).unwrap()
    }

    #[test]
    fn hold_edge_is_flat_top_at_margin() {
        let t = compute_triangle(&expert(), &Canvas::default());
        assert_eq!(t.top_left.y, 30.0);
        assert_eq!(t.top_right.y, 30.0);
        assert!(t.top_right.x > t.top_left.x);
    }

    #[test]
    fn base_vertex_centered_at_bottom() {
        let canvas = Canvas::default();
        let t = compute_triangle(&expert(), &canvas);
        assert!((t.base.x - canvas.width / 2.0).abs() < 1e-9);
        assert_eq!(t.base.y, canvas.height - canvas.margin);
    }

    #[test]
    fn scale_follows_inhale_exhale_hypotenuse() {
        let t = compute_triangle(&expert(), &Canvas::default());
        let expected = 300.0 / (16.0_f64 + 64.0).sqrt();
        assert!((t.scale - expected).abs() < 1e-12);
        assert!((t.edge(Phase::Holding).nominal_length - 7.0 * expected).abs() < 1e-9);
    }

    #[test]
    fn edges_connect_in_phase_order() {
        let t = compute_triangle(&expert(), &Canvas::default());
        assert_eq!(t.edge(Phase::Inhaling).from, t.base);
        assert_eq!(t.edge(Phase::Inhaling).to, t.top_left);
        assert_eq!(t.edge(Phase::Holding).to, t.top_right);
        assert_eq!(t.edge(Phase::Exhaling).to, t.base);
    }

    #[test]
    fn cursor_interpolates_along_phase_edge() {
        let t = compute_triangle(&expert(), &Canvas::default());
        assert_eq!(t.cursor_at(Phase::Inhaling, 0.0), t.base);
        let mid = t.cursor_at(Phase::Holding, 0.5);
        assert!((mid.x - 200.0).abs() < 1e-9);
        assert_eq!(mid.y, 30.0);
        let end = t.cursor_at(Phase::Exhaling, 1.0);
        assert!((end.x - t.base.x).abs() < 1e-9);
        assert!((end.y - t.base.y).abs() < 1e-9);
    }

    #[test]
    fn outline_path_lists_vertices() {
        let t = compute_triangle(&Pattern::new(3.0, 4.0, 4.0).unwrap(), &Canvas::default());
        // scale = 300 / 5 = 60, hold width = 240, start_x = 80
        assert_eq!(t.outline_path(), "M 200 230 L 80 30 L 320 30 Z");
        assert_eq!(t.edge(Phase::Holding).path(), "M 80 30 L 320 30");
    }

    #[test]
    fn svg_contains_edge_overlays() {
        let canvas = Canvas::default();
        let svg = compute_triangle(&expert(), &canvas).to_svg(&canvas);
        assert!(svg.contains(r#"id="edge-inhaling""#));
        assert!(svg.contains(r#"id="edge-holding""#));
        assert!(svg.contains(r#"id="edge-exhaling""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn recomputation_is_deterministic() {
        let canvas = Canvas::default();
        assert_eq!(
            compute_triangle(&expert(), &canvas),
            compute_triangle(&expert(), &canvas)
        );
    }

    proptest! {
        #[test]
        fn nominal_lengths_keep_duration_ratio(
            a in 0.1_f64..60.0,
            b in 0.1_f64..60.0,
            c in 0.1_f64..60.0,
        ) {
            let pattern = Pattern::new(a, b, c).unwrap();
            let t = compute_triangle(&pattern, &Canvas::default());
            let inhale = t.edge(Phase::Inhaling).nominal_length;
            let hold = t.edge(Phase::Holding).nominal_length;
            let exhale = t.edge(Phase::Exhaling).nominal_length;
            prop_assert!((inhale / a - hold / b).abs() < 1e-9 * t.scale.max(1.0));
            prop_assert!((hold / b - exhale / c).abs() < 1e-9 * t.scale.max(1.0));
        }
    }
}
