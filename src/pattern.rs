//! Breathing pattern value type
//!
//! A [`Pattern`] is the `(inhale, hold, exhale)` duration triple, in
//! seconds, that defines one breathing cycle. Patterns are validated on
//! construction and immutable afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One breathing cycle: inhale, hold and exhale durations in seconds.
///
/// All three durations are finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatternRepr", into = "PatternRepr")]
pub struct Pattern {
    inhale: f64,
    hold: f64,
    exhale: f64,
}

impl Pattern {
    /// Creates a validated pattern.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if any duration is zero,
    /// negative, NaN or infinite.
    pub fn new(inhale: f64, hold: f64, exhale: f64) -> Result<Self, ConfigError> {
        let input = format!("{inhale}-{hold}-{exhale}");
        for (name, value) in [("inhale", inhale), ("hold", hold), ("exhale", exhale)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidPattern {
                    input,
                    reason: format!("{name} duration must be a finite number"),
                });
            }
            if value <= 0.0 {
                return Err(ConfigError::InvalidPattern {
                    input,
                    reason: format!("{name} duration must be greater than zero"),
                });
            }
        }
        Ok(Self {
            inhale,
            hold,
            exhale,
        })
    }

    /// Creates a pattern from exactly three durations.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if `values` does not hold
    /// exactly three valid durations.
    pub fn from_slice(values: &[f64]) -> Result<Self, ConfigError> {
        match values {
            [inhale, hold, exhale] => Self::new(*inhale, *hold, *exhale),
            _ => Err(ConfigError::InvalidPattern {
                input: format!("{values:?}"),
                reason: format!("expected exactly 3 durations, got {}", values.len()),
            }),
        }
    }

    /// Preset constructor for durations known to be valid at compile time.
    pub(crate) const fn preset(inhale: f64, hold: f64, exhale: f64) -> Self {
        Self {
            inhale,
            hold,
            exhale,
        }
    }

    /// Inhale duration in seconds.
    #[must_use]
    pub const fn inhale(&self) -> f64 {
        self.inhale
    }

    /// Hold duration in seconds.
    #[must_use]
    pub const fn hold(&self) -> f64 {
        self.hold
    }

    /// Exhale duration in seconds.
    #[must_use]
    pub const fn exhale(&self) -> f64 {
        self.exhale
    }

    /// Sum of the three durations in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.inhale + self.hold + self.exhale
    }

    /// Length of one full cycle in milliseconds.
    ///
    /// Never zero: every duration is positive, and sub-millisecond totals
    /// round up to one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cycle_ms(&self) -> u64 {
        ((self.total_seconds() * 1000.0).round() as u64).max(1)
    }

    /// Breaths per minute at this pattern.
    #[must_use]
    pub fn breaths_per_minute(&self) -> f64 {
        60.0 / self.total_seconds()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.inhale, self.hold, self.exhale)
    }
}

/// Parses the `"inhale-hold-exhale"` notation, e.g. `"4-7-8"`.
impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 3 {
            return Err(ConfigError::InvalidPattern {
                input: s.to_owned(),
                reason: format!("expected 3 dash-separated durations, got {}", parts.len()),
            });
        }

        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::InvalidPattern {
                    input: s.to_owned(),
                    reason: format!("'{part}' is not a number: {e}"),
                })?;
        }

        Self::from_slice(&values).map_err(|e| match e {
            ConfigError::InvalidPattern { reason, .. } => ConfigError::InvalidPattern {
                input: s.to_owned(),
                reason,
            },
            other => other,
        })
    }
}

/// Wire form: `{ "inhale": 4, "hold": 7, "exhale": 8 }`.
#[derive(Serialize, Deserialize)]
struct PatternRepr {
    inhale: f64,
    hold: f64,
    exhale: f64,
}

impl TryFrom<PatternRepr> for Pattern {
    type Error = ConfigError;

    fn try_from(repr: PatternRepr) -> Result<Self, Self::Error> {
        Self::new(repr.inhale, repr.hold, repr.exhale)
    }
}

impl From<Pattern> for PatternRepr {
    fn from(p: Pattern) -> Self {
        Self {
            inhale: p.inhale,
            hold: p.hold,
            exhale: p.exhale,
        }
    }
}
