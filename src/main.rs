//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stock_monitor` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use stock_monitor::initialization::init_logger_with;
use stock_monitor::{run_service, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Settings and state paths may come from a .env file next to the binary
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_service(config).await {
        Ok(report) => {
            println!(
                "✅ Stopped {} monitor{} ({} restored at startup, {} command{} handled)",
                report.stopped,
                if report.stopped == 1 { "" } else { "s" },
                report.restored,
                report.commands,
                if report.commands == 1 { "" } else { "s" },
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("stock_monitor error: {:#}", e);
            process::exit(1);
        }
    }
}
