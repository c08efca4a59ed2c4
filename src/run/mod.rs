//! Service main loop.
//!
//! `run_service` loads settings, restores persisted monitors, then serves
//! commands until `quit` or Ctrl-C, and finally stops every monitor.

mod init;
mod input;

use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::{cancel_on_ctrl_c, shutdown_gracefully, Command, CommandHandler};
use crate::config::{Config, Settings};

pub use init::init_handler;
pub use input::{spawn_line_reader, spawn_stdin_reader};

/// Summary of one service run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceReport {
    /// Monitors restored from the state file at startup
    pub restored: usize,
    /// Commands executed (blank lines and `quit` not counted)
    pub commands: usize,
    /// Monitors running at shutdown
    pub stopped: usize,
}

/// Runs the monitoring service with commands read from stdin.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the settings file
/// cannot be loaded, or the HTTP client cannot be built. Nothing that
/// happens after startup is an error.
pub async fn run_service(config: Config) -> Result<ServiceReport> {
    config.validate().context("Invalid configuration")?;
    let settings = Settings::load(&config.settings)
        .await
        .with_context(|| format!("Failed to load settings from {}", config.settings.display()))?;
    let mut handler = init_handler(&config, &settings).context("Failed to initialize")?;

    let restored = handler.restore().await;

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_ctrl_c(cancel.clone());
    let lines = spawn_stdin_reader();
    let commands = serve(&mut handler, lines, cancel.clone(), std::io::stdout()).await;

    let stopped = shutdown_gracefully(handler, cancel, Some(signal_task)).await;
    Ok(ServiceReport {
        restored,
        commands,
        stopped,
    })
}

/// Executes commands from `lines` and writes each reply to `out`.
///
/// Returns on `quit` or when `cancel` fires, even while a command is still
/// running. If the input closes first, keeps waiting for `cancel`: monitors
/// keep running without a command source.
///
/// # Returns
///
/// The number of commands executed.
pub async fn serve<W: Write>(
    handler: &mut CommandHandler,
    mut lines: mpsc::Receiver<String>,
    cancel: CancellationToken,
    mut out: W,
) -> usize {
    let mut input_open = true;
    let mut executed = 0;
    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.recv(), if input_open => line,
        };
        let Some(line) = line else {
            info!("Command input closed; monitoring until interrupted");
            input_open = false;
            continue;
        };

        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => {
                respond(&mut out, "Shutting down");
                break;
            }
            Ok(Some(command)) => {
                executed += 1;
                // A slow upstream must not hold off Ctrl-C
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("Interrupted while executing a command");
                        break;
                    }
                    reply = handler.execute(command) => reply,
                }
            }
            Err(e) => e.to_string(),
        };
        respond(&mut out, &reply);
    }
    executed
}

fn respond<W: Write>(out: &mut W, reply: &str) {
    if let Err(e) = writeln!(out, "{reply}").and_then(|()| out.flush()) {
        warn!("Failed to write reply: {}", e);
    }
}
