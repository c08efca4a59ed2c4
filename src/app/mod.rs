//! Command layer.
//!
//! This module provides command parsing, dispatch to the monitor registry,
//! reply rendering and shutdown handling used by the main loop.

pub mod commands;
pub mod handler;
pub mod reply;
pub mod shutdown;

#[cfg(test)]
mod tests;

// Re-export public API
pub use commands::{help_text, Command, CommandKind};
pub use handler::{CommandHandler, StopOutcome};
pub use shutdown::{cancel_on_ctrl_c, shutdown_gracefully};
