//! Built-in pattern catalog
//!
//! Maps the three difficulty levels to their breathing patterns and
//! offers lookup with typo suggestions for level names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pattern::Pattern;

/// Difficulty level selecting a preset pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// 2-4-4
    Newbie,
    /// 3-5-6
    Medium,
    /// 4-7-8, the default
    #[default]
    Expert,
}

impl Level {
    /// All levels in ascending difficulty.
    pub const ALL: [Self; 3] = [Self::Newbie, Self::Medium, Self::Expert];

    /// Stable identifier used in preferences and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newbie => "newbie",
            Self::Medium => "medium",
            Self::Expert => "expert",
        }
    }

    /// The preset pattern for this level.
    #[must_use]
    pub fn pattern(self) -> Pattern {
        preset(self).pattern
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownLevel {
                name: s.to_owned(),
                suggestion: suggest_level(&needle),
            })
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    /// Level this preset belongs to.
    pub level: Level,
    /// The breathing pattern.
    pub pattern: Pattern,
}

static PRESETS: [Preset; 3] = [
    Preset {
        level: Level::Newbie,
        pattern: Pattern::preset(2.0, 4.0, 4.0),
    },
    Preset {
        level: Level::Medium,
        pattern: Pattern::preset(3.0, 5.0, 6.0),
    },
    Preset {
        level: Level::Expert,
        pattern: Pattern::preset(4.0, 7.0, 8.0),
    },
];

fn preset(level: Level) -> Preset {
    match level {
        Level::Newbie => PRESETS[0],
        Level::Medium => PRESETS[1],
        Level::Expert => PRESETS[2],
    }
}

/// Returns all presets in ascending difficulty.
#[must_use]
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Returns the preset whose pattern equals `pattern`, if any.
#[must_use]
pub fn level_for(pattern: &Pattern) -> Option<Level> {
    PRESETS
        .iter()
        .find(|p| p.pattern == *pattern)
        .map(|p| p.level)
}

/// Suggest a level name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_level(input: &str) -> Option<String> {
    Level::ALL
        .iter()
        .map(|l| (l.as_str(), strsim::damerau_levenshtein(input, l.as_str())))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn levels_map_to_documented_patterns() {
        assert_eq!(Level::Newbie.pattern(), Pattern::new(2.0, 4.0, 4.0).unwrap());
        assert_eq!(Level::Medium.pattern(), Pattern::new(3.0, 5.0, 6.0).unwrap());
        assert_eq!(Level::Expert.pattern(), Pattern::new(4.0, 7.0, 8.0).unwrap());
    }

    #[test]
    fn default_level_is_expert() {
        assert_eq!(Level::default(), Level::Expert);
    }

    #[test]
    fn preset_patterns_pass_validation() {
        for p in presets() {
            let pattern = p.pattern;
            assert!(
                Pattern::new(pattern.inhale(), pattern.hold(), pattern.exhale()).is_ok(),
                "preset {} must be valid",
                p.level
            );
        }
    }

    #[test]
    fn no_duplicate_levels() {
        let levels: HashSet<Level> = presets().iter().map(|p| p.level).collect();
        assert_eq!(levels.len(), presets().len());
    }

    #[test]
    fn parse_level_case_insensitive() {
        assert_eq!("Expert".parse::<Level>().unwrap(), Level::Expert);
        assert_eq!(" newbie ".parse::<Level>().unwrap(), Level::Newbie);
    }

    #[test]
    fn parse_unknown_level_suggests() {
        let err = "medum".parse::<Level>().unwrap_err();
        match err {
            ConfigError::UnknownLevel { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("medium"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn suggest_level_returns_none_for_distant_input() {
        assert_eq!(suggest_level("completely-unrelated"), None);
    }

    #[test]
    fn level_for_recognizes_presets() {
        assert_eq!(level_for(&Pattern::new(3.0, 5.0, 6.0).unwrap()), Some(Level::Medium));
        assert_eq!(level_for(&Pattern::new(5.0, 5.0, 5.0).unwrap()), None);
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Medium).unwrap(), "\"medium\"");
        let level: Level = serde_json::from_str("\"newbie\"").unwrap();
        assert_eq!(level, Level::Newbie);
    }
}
