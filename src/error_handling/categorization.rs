//! Error categorization and retry strategy.
//!
//! This module maps fetch failures onto poll outcome categories and configures
//! the backoff used for one-shot fetches.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{FetchError, PollOutcome};

/// Creates an exponential backoff retry strategy.
///
/// Used for the fetches that happen once per monitor (size mapping, product
/// metadata), where one transient failure would otherwise degrade the monitor
/// for its whole lifetime. Stock polls are never retried this way; the next
/// tick is their retry.
///
/// # Returns
///
/// A retry strategy iterator ready for use with `tokio_retry::Retry`:
/// `RETRY_INITIAL_DELAY_MS`, then growing by `RETRY_GROWTH` per retry, capped
/// at `RETRY_MAX_DELAY_SECS` and limited to `RETRY_MAX_ATTEMPTS` retries.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    // tokio-retry yields growth^n * factor ms for n = 1, 2, ...
    ExponentialBackoff::from_millis(crate::config::RETRY_GROWTH)
        .factor(crate::config::RETRY_INITIAL_DELAY_MS / crate::config::RETRY_GROWTH)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `FetchError` into a `PollOutcome`.
pub fn categorize_fetch_error(error: &FetchError) -> PollOutcome {
    match error {
        FetchError::Transport { source, .. } => {
            if source.is_timeout() {
                PollOutcome::Timeout
            } else if source.is_connect() {
                PollOutcome::ConnectError
            } else if source.is_decode() || source.is_body() {
                PollOutcome::MalformedResponse
            } else {
                PollOutcome::TransportError
            }
        }
        FetchError::Status { .. } => PollOutcome::HttpStatusError,
        FetchError::Malformed { .. } => PollOutcome::MalformedResponse,
        FetchError::Closed => PollOutcome::Discarded,
    }
}

/// Determines if a fetch error is worth retrying.
///
/// Network failures, rate limiting (429) and server errors (5xx) are
/// transient. Client errors, bad payloads and a closed monitor are not.
pub fn is_retriable(error: &FetchError) -> bool {
    match error {
        FetchError::Transport { .. } => true,
        FetchError::Status { status, .. } => {
            *status == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS || *status >= 500
        }
        FetchError::Malformed { .. } | FetchError::Closed => false,
    }
}
