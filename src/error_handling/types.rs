//! Error type definitions.
//!
//! This module defines all error types used throughout the application, plus
//! the categories poll outcomes are counted under.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The settings file is missing or invalid.
    #[error("Settings error: {0}")]
    SettingsError(String),
}

/// A failed upstream fetch.
///
/// None of these stop a monitor: the watch loop logs them and polls again on
/// the next tick.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure, timeout, or body read error.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The endpoint answered with a non-success status code.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not JSON or did not have the expected shape.
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    /// The monitor was closed before or while the request was in flight.
    #[error("monitor is closed")]
    Closed,
}

/// A product URL that cannot be monitored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("`{0}` is not a valid http(s) URL")]
    InvalidUrl(String),

    #[error("`{url}` has no `{param}` product id parameter")]
    MissingProductId { url: String, param: &'static str },
}

/// Rejections from the monitor registry. These are user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The URL is already monitored at this destination.
    #[error("This product is already being monitored: {url}")]
    DuplicateMonitor { destination: String, url: String },

    /// `index` is outside `1..=len` for the destination.
    #[error("Invalid product number {index}: expected 1 to {len}")]
    InvalidIndex { index: usize, len: usize },
}

/// Reading or writing the registry state file failed.
///
/// Never fatal: monitoring continues in memory.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Product page metadata could not be extracted.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("product page request failed: {0}")]
    Request(#[from] ReqwestError),

    #[error("product page returned HTTP {0}")]
    Status(u16),

    #[error("product page has no {0}")]
    MissingField(&'static str),
}

/// A notification could not be delivered.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("destination `{0}` is not reachable")]
    UnknownDestination(String),

    #[error("notification delivery failed: {0}")]
    Delivery(#[from] ReqwestError),

    #[error("destination rejected notification with HTTP {0}")]
    Rejected(u16),
}

/// Everything a command can report back to the user.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Error starting monitor: {0}")]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Unknown destination `{0}`")]
    UnknownDestination(String),

    #[error("Unknown notify target `{0}`")]
    UnknownNotifyTarget(String),

    #[error("Usage: {0}")]
    Usage(String),
}

/// Outcome categories of a single stock poll.
///
/// Failures are split the way they are logged, so status reports can show
/// why a monitor is not seeing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum PollOutcome {
    Success,
    Timeout,
    ConnectError,
    HttpStatusError,
    MalformedResponse,
    TransportError,
    Discarded, // response arrived after the monitor was closed
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PollOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollOutcome::Success => "success",
            PollOutcome::Timeout => "timeout",
            PollOutcome::ConnectError => "connect error",
            PollOutcome::HttpStatusError => "HTTP status error",
            PollOutcome::MalformedResponse => "malformed response",
            PollOutcome::TransportError => "transport error",
            PollOutcome::Discarded => "discarded",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, PollOutcome::Success | PollOutcome::Discarded)
    }
}
