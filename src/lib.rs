//! stock_monitor library: storefront restock monitoring
//!
//! This library watches product pages of a storefront inventory API and
//! notifies destinations when a product comes back in stock. Each monitored
//! product polls its availability endpoint sequentially; a notification is
//! sent when the stock picture changes and at least one size can be bought.
//!
//! # Example
//!
//! ```no_run
//! use stock_monitor::{run_service, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     poll_interval_ms: 2_000,
//!     ..Default::default()
//! };
//!
//! let report = run_service(config).await?;
//! println!("Restored {} monitors, stopped {}", report.restored, report.stopped);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod metadata;
pub mod monitor;
pub mod notify;
pub mod registry;
mod run;
pub mod stock;
pub mod watch;

// Re-export public API
pub use app::{Command, CommandHandler};
pub use config::{Config, LogFormat, LogLevel, Settings};
pub use monitor::ProductMonitor;
pub use registry::MonitorRegistry;
pub use run::{init_handler, run_service, serve, spawn_line_reader, ServiceReport};
pub use watch::{WatchState, WatchTask};
