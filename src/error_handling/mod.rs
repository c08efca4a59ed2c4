//! Error handling and poll statistics.
//!
//! This module provides:
//! - Error type definitions for every layer (fetch, registry, persistence, commands)
//! - Poll outcome categorization and per-monitor counters
//! - Retry strategy configuration for one-shot fetches
//!
//! Errors fall into two groups:
//! - **Absorbed**: fetch and persistence failures are logged and monitoring continues
//! - **Surfaced**: duplicate/index/identity errors are returned to the command caller

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_fetch_error, get_retry_strategy, is_retriable};
pub use stats::{PollStats, PollSummary};
pub use types::{
    CommandError, FetchError, IdentityError, InitializationError, MetadataError, NotifyError,
    PersistenceError, PollOutcome, RegistryError,
};
