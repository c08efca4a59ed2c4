//! HTTP client initialization.
//!
//! Every product monitor owns its own client (its "session"), created lazily
//! on first use. This module holds the shared construction rules.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Settings every upstream HTTP client is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&Config> for ClientOptions {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Initializes an HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from options
/// - Timeout from options (covers connect, request and body read)
/// - Redirect following enabled (reqwest default, up to 10 hops)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(options: &ClientOptions) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(options.timeout)
        .user_agent(options.user_agent.clone())
        .build()
}
