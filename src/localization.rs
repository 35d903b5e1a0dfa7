//! User-facing labels in French and English
//!
//! A [`LocalizationTable`] is an explicit value handed to whatever renders
//! text; nothing here reads or writes global state except
//! [`Language::detect`], which inspects the locale environment once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Level;
use crate::error::ConfigError;
use crate::phase::Phase;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French.
    Fr,
    /// English, the fallback.
    #[default]
    En,
}

impl Language {
    /// Both languages.
    pub const ALL: [Self; 2] = [Self::Fr, Self::En];

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }

    /// Picks the language from a locale string such as `fr_FR.UTF-8`.
    #[must_use]
    pub fn from_locale(locale: &str) -> Self {
        if locale.to_ascii_lowercase().starts_with("fr") {
            Self::Fr
        } else {
            Self::En
        }
    }

    /// Detects the language from `LC_ALL`, then `LANG`.
    #[must_use]
    pub fn detect() -> Self {
        ["LC_ALL", "LANG"]
            .into_iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map_or_else(Self::default, |locale| Self::from_locale(&locale))
    }

    /// Label table for this language.
    #[must_use]
    pub const fn table(self) -> &'static LocalizationTable {
        match self {
            Self::Fr => &FRENCH,
            Self::En => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            _ => Err(ConfigError::InvalidValue {
                field: "language".to_owned(),
                value: s.to_owned(),
                expected: "'fr' or 'en'".to_owned(),
            }),
        }
    }
}

/// Labels for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizationTable {
    /// Application title.
    pub title: &'static str,
    /// Shown before the first phase.
    pub ready: &'static str,
    /// Inhale label.
    pub inhaling: &'static str,
    /// Hold label.
    pub holding: &'static str,
    /// Exhale label.
    pub exhaling: &'static str,
    /// Newbie level name.
    pub newbie: &'static str,
    /// Medium level name.
    pub medium: &'static str,
    /// Expert level name.
    pub expert: &'static str,
    /// "Cycles" counter label.
    pub cycles: &'static str,
    /// Level setting label.
    pub level: &'static str,
    /// Language setting label.
    pub language: &'static str,
    /// Custom pattern setting label.
    pub pattern: &'static str,
    /// Heading for the stored preferences.
    pub settings: &'static str,
}

static FRENCH: LocalizationTable = LocalizationTable {
    title: "Respiration Guidée",
    ready: "Prêt",
    inhaling: "Inspirez",
    holding: "Retenez",
    exhaling: "Expirez",
    newbie: "Débutant",
    medium: "Intermédiaire",
    expert: "Expert",
    cycles: "Cycles",
    level: "Niveau",
    language: "Langue",
    pattern: "Motif",
    settings: "Paramètres",
};

static ENGLISH: LocalizationTable = LocalizationTable {
    title: "Guided Breathing",
    ready: "Ready",
    inhaling: "Inhale",
    holding: "Hold",
    exhaling: "Exhale",
    newbie: "Beginner",
    medium: "Intermediate",
    expert: "Expert",
    cycles: "Cycles",
    level: "Level",
    language: "Language",
    pattern: "Pattern",
    settings: "Settings",
};

impl LocalizationTable {
    /// Label for a phase.
    #[must_use]
    pub const fn phase(&self, phase: Phase) -> &'static str {
        match phase {
            Phase::Inhaling => self.inhaling,
            Phase::Holding => self.holding,
            Phase::Exhaling => self.exhaling,
        }
    }

    /// Display name for a level.
    #[must_use]
    pub const fn level_name(&self, level: Level) -> &'static str {
        match level {
            Level::Newbie => self.newbie,
            Level::Medium => self.medium,
            Level::Expert => self.expert,
        }
    }
}
