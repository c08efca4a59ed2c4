//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_API_BASE, DEFAULT_COOLDOWN, DEFAULT_POLL_INTERVAL, DEFAULT_SETTINGS_PATH,
    DEFAULT_STATE_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Application configuration.
///
/// Parsed from the command line by the binary, or constructed directly by
/// library users and tests.
///
/// # Examples
///
/// ```no_run
/// use stock_monitor::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     state_file: PathBuf::from("/var/lib/stock_monitor/monitors.json"),
///     poll_interval_ms: 2_000,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "stock_monitor", about = "Watch storefront products and notify on restocks")]
pub struct Config {
    /// JSON settings file (market id and notification destinations)
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH, env = "STOCK_MONITOR_SETTINGS")]
    pub settings: PathBuf,

    /// File the monitor registry is persisted to
    #[arg(long, default_value = DEFAULT_STATE_PATH, env = "STOCK_MONITOR_STATE")]
    pub state_file: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Base URL of the storefront catalog API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Delay between stock checks of one product, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Pause after a notification before polling resumes, in milliseconds
    #[arg(long, default_value_t = DEFAULT_COOLDOWN.as_millis() as u64)]
    pub cooldown_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: PathBuf::from(DEFAULT_SETTINGS_PATH),
            state_file: PathBuf::from(DEFAULT_STATE_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
        }
    }
}

/// A configuration value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for `{field}`: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong and what is accepted
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Config {
    /// Checks that the configuration can drive the monitors.
    ///
    /// # Errors
    ///
    /// Returns the first offending field: zero timeout, zero poll interval,
    /// a cool-down shorter than the poll interval, or an unparseable API base.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::new(
                "timeout_seconds",
                "must be greater than 0",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigValidationError::new(
                "poll_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.cooldown_ms < self.poll_interval_ms {
            return Err(ConfigValidationError::new(
                "cooldown_ms",
                format!(
                    "must be at least the poll interval ({} ms)",
                    self.poll_interval_ms
                ),
            ));
        }
        if url::Url::parse(&self.api_base).is_err() {
            return Err(ConfigValidationError::new(
                "api_base",
                format!("`{}` is not an absolute URL", self.api_base),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
