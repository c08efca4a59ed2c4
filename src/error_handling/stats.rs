//! Poll statistics tracking.
//!
//! This module provides thread-safe counters for the outcome of every stock
//! poll a monitor performs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::PollOutcome;

/// Thread-safe poll statistics tracker.
///
/// Tracks poll outcomes using atomic counters, so the watch task can record
/// while the command layer reads a status report. All outcomes are
/// initialized to zero on creation.
pub struct PollStats {
    outcomes: HashMap<PollOutcome, AtomicUsize>,
}

impl Default for PollStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStats {
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in PollOutcome::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        PollStats { outcomes }
    }

    /// Record one poll outcome.
    pub fn record(&self, outcome: PollOutcome) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to record poll outcome {:?} which is not in the map. \
                 This indicates a bug in PollStats initialization.",
                outcome
            );
        }
    }

    /// Get the count for an outcome.
    pub fn count(&self, outcome: PollOutcome) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of polls attempted.
    pub fn total(&self) -> usize {
        PollOutcome::iter().map(|o| self.count(o)).sum()
    }

    /// Number of polls that failed (network, status, or payload errors).
    pub fn failures(&self) -> usize {
        PollOutcome::iter()
            .filter(PollOutcome::is_failure)
            .map(|o| self.count(o))
            .sum()
    }

    /// Point-in-time copy of the counters, for reports.
    pub fn summary(&self) -> PollSummary {
        PollSummary {
            total: self.total(),
            successful: self.count(PollOutcome::Success),
            failed: self.failures(),
        }
    }
}

/// Snapshot of a monitor's poll counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
