//! `vague` - Guided triangle breathing in the terminal

use clap::Parser;

use vague::cli::args::{Cli, LogFormatArg};
use vague::cli::commands;
use vague::driver::Shutdown;
use vague::error::ExitCode;
use vague::observability::{LogFormat, StopReason, init_logging};

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let format = match cli.log_format {
            LogFormatArg::Human => LogFormat::Human,
            LogFormatArg::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(ExitCode::ERROR);
        }
    };

    let code = runtime.block_on(async {
        let shutdown = Shutdown::new();

        // Signal handler for graceful shutdown
        let signals = shutdown.clone();
        tokio::spawn(async move {
            let reason = wait_for_signal().await;
            signals.trigger(reason);

            let second = wait_for_signal().await;
            eprintln!("\nforced exit");
            std::process::exit(match second {
                StopReason::Terminated => ExitCode::TERMINATED,
                _ => ExitCode::INTERRUPTED,
            });
        });

        match commands::dispatch(cli, shutdown).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {e}");
                e.exit_code()
            }
        }
    });

    std::process::exit(code);
}

/// Waits for SIGINT or SIGTERM.
#[cfg(unix)]
async fn wait_for_signal() -> StopReason {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            result = tokio::signal::ctrl_c() => interrupted(result).await,
            _ = sigterm.recv() => StopReason::Terminated,
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            interrupted(tokio::signal::ctrl_c().await).await
        }
    }
}

/// Waits for Ctrl+C.
#[cfg(not(unix))]
async fn wait_for_signal() -> StopReason {
    interrupted(tokio::signal::ctrl_c().await).await
}

/// Maps a Ctrl+C result; a failed listener never resolves.
async fn interrupted(result: std::io::Result<()>) -> StopReason {
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    StopReason::Interrupted
}
