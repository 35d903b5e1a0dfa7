//! Session configuration schema
//!
//! Every field has a default, so an empty mapping (or no file at all)
//! yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Canvas;
use crate::phase::milestone::DEFAULT_TOLERANCE;

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Drawing surface for the triangle.
    pub canvas: Canvas,
    /// Milestone marker settings.
    pub milestones: MilestoneConfig,
    /// Scheduling and countdown settings.
    pub timing: TimingConfig,
}

/// Milestone marker settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MilestoneConfig {
    /// Half-width of the window around a checkpoint, as a phase fraction.
    pub tolerance: f64,
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Scheduling and countdown settings, in milliseconds unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Frame tick period.
    pub frame_interval_ms: u64,
    /// Timer display refresh period.
    pub display_interval_ms: u64,
    /// Countdown length in seconds; 0 starts immediately.
    pub countdown_secs: u32,
    /// Largest gap between frames before the session counts as stalled.
    pub max_tick_gap_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            display_interval_ms: 1_000,
            countdown_secs: 3,
            max_tick_gap_ms: 1_000,
        }
    }
}

impl TimingConfig {
    /// Frame tick period.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Timer display refresh period.
    #[must_use]
    pub const fn display_interval(&self) -> Duration {
        Duration::from_millis(self.display_interval_ms)
    }
}

impl SessionConfig {
    /// Checks value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canvas = &self.canvas;
        positive("canvas.width", canvas.width)?;
        positive("canvas.height", canvas.height)?;
        positive("canvas.base_edge_target", canvas.base_edge_target)?;
        if !canvas.margin.is_finite() || canvas.margin < 0.0 || canvas.margin >= canvas.height / 2.0 {
            return Err(invalid(
                "canvas.margin",
                canvas.margin,
                "a non-negative number smaller than half the canvas height",
            ));
        }

        let tolerance = self.milestones.tolerance;
        if !(tolerance > 0.0 && tolerance < 0.5) {
            return Err(invalid(
                "milestones.tolerance",
                tolerance,
                "a number in the open interval (0, 0.5)",
            ));
        }

        let timing = &self.timing;
        if timing.frame_interval_ms == 0 {
            return Err(invalid("timing.frame_interval_ms", 0, "a positive integer"));
        }
        if timing.display_interval_ms == 0 {
            return Err(invalid("timing.display_interval_ms", 0, "a positive integer"));
        }
        if timing.max_tick_gap_ms <= timing.frame_interval_ms {
            return Err(invalid(
                "timing.max_tick_gap_ms",
                timing.max_tick_gap_ms,
                "a value larger than timing.frame_interval_ms",
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "a positive finite number"))
    }
}

fn invalid(field: &str, value: impl ToString, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        value: value.to_string(),
        expected: expected.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidValue { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.timing.frame_interval_ms, 16);
        assert_eq!(config.timing.countdown_secs, 3);
        assert_eq!(config.milestones.tolerance, 0.05);
        assert_eq!(config.canvas, Canvas::default());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: SessionConfig = serde_yaml::from_str("timing:\n  countdown_secs: 0\n").unwrap();
        assert_eq!(config.timing.countdown_secs, 0);
        assert_eq!(config.timing.display_interval_ms, 1_000);
        assert_eq!(config.canvas.width, 400.0);
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<SessionConfig, _> = serde_yaml::from_str("timing:\n  tick_ms: 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_tolerance_out_of_range() {
        let mut config = SessionConfig::default();
        config.milestones.tolerance = 0.5;
        assert_eq!(field_of(config.validate().unwrap_err()), "milestones.tolerance");
        config.milestones.tolerance = f64::NAN;
        assert_eq!(field_of(config.validate().unwrap_err()), "milestones.tolerance");
    }

    #[test]
    fn rejects_margin_past_half_height() {
        let mut config = SessionConfig::default();
        config.canvas.margin = 130.0;
        assert_eq!(field_of(config.validate().unwrap_err()), "canvas.margin");
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut config = SessionConfig::default();
        config.timing.frame_interval_ms = 0;
        assert_eq!(field_of(config.validate().unwrap_err()), "timing.frame_interval_ms");

        let mut config = SessionConfig::default();
        config.timing.max_tick_gap_ms = 10;
        assert_eq!(field_of(config.validate().unwrap_err()), "timing.max_tick_gap_ms");
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let mut config = SessionConfig::default();
        config.canvas.width = 0.0;
        assert_eq!(field_of(config.validate().unwrap_err()), "canvas.width");
    }
}
