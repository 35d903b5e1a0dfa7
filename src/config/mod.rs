//! Configuration module
//!
//! Session configuration (YAML) and persisted user preferences.

pub mod loader;
pub mod preferences;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use preferences::{
    JsonFileStore, MemoryStore, PREFERENCES_KEY, PreferenceStore, Preferences, load_preferences,
    save_preferences,
};
pub use schema::{MilestoneConfig, SessionConfig, TimingConfig};
