//! `prefs` command handlers
//!
//! Implements `prefs show` and `prefs set`.

use serde_json::json;

use crate::cli::args::{OutputFormat, PrefsSetArgs, PrefsShowArgs};
use crate::config::{PreferenceStore, Preferences, load_preferences, save_preferences};
use crate::error::VagueError;
use crate::localization::Language;

/// Print the stored preferences.
///
/// # Errors
///
/// Returns `VagueError::Json` if JSON encoding fails.
pub fn show(args: &PrefsShowArgs, store: &dyn PreferenceStore) -> Result<(), VagueError> {
    let prefs = load_preferences(store, Language::detect());
    match args.format {
        OutputFormat::Human => print!("{}", render_human(&prefs)),
        OutputFormat::Json => {
            let value = json!({
                "language": prefs.language,
                "mode": prefs.mode,
                "pattern": prefs.pattern.map(|p| p.to_string()),
                "effective_pattern": prefs.effective_pattern().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

/// Apply changes to the stored preferences.
///
/// # Errors
///
/// Returns `VagueError::Preferences` if the store cannot be written.
pub fn set(args: &PrefsSetArgs, store: &mut dyn PreferenceStore) -> Result<(), VagueError> {
    let mut prefs = load_preferences(store, Language::detect());
    apply(&mut prefs, args);
    save_preferences(store, &prefs)?;
    tracing::info!(
        language = %prefs.language,
        mode = %prefs.mode,
        pattern = %prefs.effective_pattern(),
        "preferences updated"
    );
    Ok(())
}

fn apply(prefs: &mut Preferences, args: &PrefsSetArgs) {
    if let Some(level) = args.level {
        prefs.mode = level;
        prefs.pattern = None;
    }
    if let Some(language) = args.language {
        prefs.language = language;
    }
    if let Some(pattern) = args.pattern {
        prefs.pattern = Some(pattern);
    }
    if args.clear_pattern {
        prefs.pattern = None;
    }
}

fn render_human(prefs: &Preferences) -> String {
    let labels = prefs.language.table();
    let pattern = prefs
        .pattern
        .map_or_else(|| "-".to_owned(), |p| p.to_string());
    format!(
        "{}\n{}: {}\n{}: {} ({})\n{}: {pattern}\n",
        labels.settings,
        labels.language,
        prefs.language,
        labels.level,
        prefs.mode,
        labels.level_name(prefs.mode),
        labels.pattern,
    )
}
