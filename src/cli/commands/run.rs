//! `run` command handler
//!
//! Builds a session from configuration, preferences and flags, attaches
//! the terminal presenter and the optional event stream, and drives it
//! until it stops.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::args::{ColorChoice, RunArgs};
use crate::config::{load_preferences, save_preferences};
use crate::driver::{Driver, RunLimits, Shutdown};
use crate::error::{ExitCode, VagueError};
use crate::localization::Language;
use crate::observability::{EventEmitter, StopReason, ansi_enabled};
use crate::presenter::TerminalPresenter;
use crate::session::Session;
use crate::time::MonotonicClock;

use super::{load_session_config, open_store};

/// Run a breathing session in the terminal.
///
/// The live view redraws its status line with escape codes, so it follows
/// the same `--color` decision as the logs.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the event
/// file cannot be created or the metrics endpoint cannot be bound.
pub async fn run(
    args: &RunArgs,
    quiet: bool,
    color: ColorChoice,
    shutdown: Shutdown,
) -> Result<i32, VagueError> {
    let mut config = load_session_config(args.config.as_deref())?;
    if args.no_countdown {
        config.timing.countdown_secs = 0;
    }

    let mut store = open_store(args.prefs.as_deref());
    let mut prefs = load_preferences(store.as_ref(), Language::detect());

    // Explicit choices on the command line become the new preferences.
    let mut changed = false;
    if let Some(level) = args.selection.level {
        prefs.mode = level;
        prefs.pattern = None;
        changed = true;
    }
    if let Some(pattern) = args.selection.pattern {
        prefs.pattern = Some(pattern);
        changed = true;
    }
    if let Some(language) = args.language {
        prefs.language = language;
        changed = true;
    }
    if changed {
        if let Err(e) = save_preferences(store.as_mut(), &prefs) {
            warn!(error = %e, "could not save preferences");
        }
    }

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let mut session = Session::from_preferences(config, &prefs);

    let events_to_stdout = args.events.as_deref() == Some(Path::new("-"));
    if let Some(path) = &args.events {
        let emitter = if events_to_stdout {
            EventEmitter::stdout()
        } else {
            EventEmitter::from_file(path)?
        };
        session = session.with_emitter(Arc::new(emitter));
    }

    let presenter = (!quiet).then(|| {
        // Keep stdout clean for the event stream when it goes there.
        let (out, tty): (Box<dyn Write + Send>, bool) = if events_to_stdout {
            (Box::new(std::io::stderr()), std::io::stderr().is_terminal())
        } else {
            (Box::new(std::io::stdout()), std::io::stdout().is_terminal())
        };
        let live = ansi_enabled(color, tty);
        let rx = session.subscribe();
        tokio::spawn(TerminalPresenter::new(out, prefs.language, live).run(rx))
    });

    let limits = RunLimits {
        max_cycles: args.cycles,
        max_duration: args.duration,
    };
    let driver = Driver::new(MonotonicClock::new(), limits, shutdown);
    let reason = driver.run(&mut session).await;

    // Dropping the session closes the presenter's channel.
    drop(session);
    if let Some(handle) = presenter {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "terminal output failed"),
            Err(e) => warn!(error = %e, "presenter task failed"),
        }
    }

    Ok(exit_code_for(reason))
}

/// Exit code for a session that ended for `reason`.
#[must_use]
pub const fn exit_code_for(reason: StopReason) -> i32 {
    match reason {
        StopReason::Interrupted => ExitCode::INTERRUPTED,
        StopReason::Terminated => ExitCode::TERMINATED,
        StopReason::User | StopReason::Hidden | StopReason::Stalled | StopReason::Completed => {
            ExitCode::SUCCESS
        }
    }
}
