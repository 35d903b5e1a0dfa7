//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod patterns;
pub mod prefs;
pub mod run;
pub mod triangle;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::catalog::Level;
use crate::cli::args::{Cli, Commands, PatternSelection, PrefsSubcommand};
use crate::config::{JsonFileStore, MemoryStore, PreferenceStore, SessionConfig, load_config};
use crate::driver::Shutdown;
use crate::error::{ExitCode, VagueError};
use crate::pattern::Pattern;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// Returns the process exit code on success.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, shutdown: Shutdown) -> Result<i32, VagueError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cli.quiet, cli.color, shutdown).await,
        Commands::Patterns(args) => {
            patterns::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Triangle(args) => {
            triangle::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Prefs(cmd) => {
            let mut store = open_store(cmd.prefs.as_deref());
            match cmd.subcommand {
                PrefsSubcommand::Show(args) => prefs::show(&args, store.as_ref())?,
                PrefsSubcommand::Set(args) => prefs::set(&args, store.as_mut())?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Opens the preference store at `path`, or at the per-user default.
///
/// Falls back to an in-memory store (nothing persists) when no location
/// can be determined.
pub(crate) fn open_store(path: Option<&Path>) -> Box<dyn PreferenceStore + Send> {
    let path: Option<PathBuf> = path
        .map(Path::to_path_buf)
        .or_else(crate::config::preferences::default_path);
    path.map_or_else(
        || {
            warn!("no preference location available; preferences will not persist");
            Box::new(MemoryStore::new()) as Box<dyn PreferenceStore + Send>
        },
        |p| Box::new(JsonFileStore::new(p)),
    )
}

/// Loads the session configuration file if one was given.
pub(crate) fn load_session_config(path: Option<&Path>) -> Result<SessionConfig, VagueError> {
    match path {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            Ok(load_config(path)?)
        }
        None => Ok(SessionConfig::default()),
    }
}

/// Resolves `--level` / `--pattern`, falling back to `default`.
pub(crate) fn resolve_pattern(selection: &PatternSelection, default: Pattern) -> Pattern {
    selection
        .pattern
        .or_else(|| selection.level.map(Level::pattern))
        .unwrap_or(default)
}
