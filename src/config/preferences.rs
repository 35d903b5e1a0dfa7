//! Persisted user preferences
//!
//! Preferences live under a single key of an opaque key-value
//! [`PreferenceStore`] as a JSON document:
//!
//! ```json
//! { "language": "fr", "mode": "expert", "pattern": "4-7-8" }
//! ```
//!
//! Reading is forgiving: a missing key, corrupt JSON or an invalid field
//! falls back to defaults with a warning and never fails. Only writes can
//! return errors.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Level;
use crate::error::PreferencesError;
use crate::localization::Language;
use crate::pattern::Pattern;

/// Key the preference document is stored under.
pub const PREFERENCES_KEY: &str = "breathing-app-prefs";

/// Opaque key-value storage capability.
pub trait PreferenceStore {
    /// Returns the stored value, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError>;
}

// ============================================================================
// Stores
// ============================================================================

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a JSON object file mapping keys to string values.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, if one can be determined.
    #[must_use]
    pub fn at_default_location() -> Option<Self> {
        default_path().map(Self::new)
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read preference file");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "preference file is corrupt; ignoring");
            BTreeMap::new()
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let mut entries = self.read_entries();
        entries.insert(key.to_owned(), value.to_owned());
        let encoded = serde_json::to_string_pretty(&entries)?;

        let write_err = |source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, encoded).map_err(write_err)?;
        debug!(path = %self.path.display(), key, "preference stored");
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/vague/prefs.json`, else `$HOME/.config/vague/prefs.json`.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(base.join("vague").join("prefs.json"))
}

// ============================================================================
// Preferences
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    /// Interface language.
    pub language: Language,
    /// Selected difficulty level.
    pub mode: Level,
    /// Custom pattern overriding the level preset.
    pub pattern: Option<Pattern>,
}

/// Stored form. Every field is optional and kept as text so one bad field
/// does not discard the others.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
}

impl Preferences {
    /// Defaults: expert level, `language`, no custom pattern.
    #[must_use]
    pub const fn defaults(language: Language) -> Self {
        Self {
            language,
            mode: Level::Expert,
            pattern: None,
        }
    }

    /// Pattern to breathe: the custom one if set, else the level preset.
    #[must_use]
    pub fn effective_pattern(&self) -> Pattern {
        self.pattern.unwrap_or_else(|| self.mode.pattern())
    }

    /// Decodes a stored document, falling back field by field.
    ///
    /// Never fails: corrupt input yields defaults with `fallback_language`.
    #[must_use]
    pub fn decode(raw: &str, fallback_language: Language) -> Self {
        let mut prefs = Self::defaults(fallback_language);

        let stored: StoredPreferences = match serde_json::from_str(raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "stored preferences are corrupt; using defaults");
                return prefs;
            }
        };

        if let Some(language) = stored.language {
            match language.parse() {
                Ok(language) => prefs.language = language,
                Err(e) => warn!(error = %e, "ignoring stored language"),
            }
        }
        if let Some(mode) = stored.mode {
            match mode.parse() {
                Ok(mode) => prefs.mode = mode,
                Err(e) => warn!(error = %e, "ignoring stored level"),
            }
        }
        if let Some(pattern) = stored.pattern {
            match pattern.parse() {
                Ok(pattern) => prefs.pattern = Some(pattern),
                Err(e) => warn!(error = %e, "ignoring stored pattern"),
            }
        }
        prefs
    }

    /// Encodes the preferences as the stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError::Encode` if serialization fails.
    pub fn encode(&self) -> Result<String, PreferencesError> {
        let stored = StoredPreferences {
            language: Some(self.language.code().to_owned()),
            mode: Some(self.mode.as_str().to_owned()),
            pattern: self.pattern.map(|p| p.to_string()),
        };
        Ok(serde_json::to_string(&stored)?)
    }
}

/// Loads preferences from `store`, falling back to defaults.
#[must_use]
pub fn load_preferences(store: &dyn PreferenceStore, fallback_language: Language) -> Preferences {
    store.get(PREFERENCES_KEY).map_or_else(
        || {
            debug!("no stored preferences; using defaults");
            Preferences::defaults(fallback_language)
        },
        |raw| Preferences::decode(&raw, fallback_language),
    )
}

/// Saves preferences to `store`.
///
/// # Errors
///
/// Returns `PreferencesError` if encoding or writing fails.
pub fn save_preferences(
    store: &mut dyn PreferenceStore,
    prefs: &Preferences,
) -> Result<(), PreferencesError> {
    store.set(PREFERENCES_KEY, &prefs.encode()?)
}
