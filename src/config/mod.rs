//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (poll timing, upstream defaults, retry parameters)
//! - Request header values
//! - CLI option types and parsing
//! - The JSON settings file (market id, destinations)

mod constants;
mod headers;
mod settings;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use settings::{DestinationSettings, Settings};
pub use types::{Config, ConfigValidationError, LogFormat, LogLevel};
