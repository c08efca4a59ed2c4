//! Stock snapshots and change detection.

use std::collections::BTreeMap;

use crate::config::{AVAILABILITY_IN_STOCK, AVAILABILITY_LOW_ON_STOCK, AVAILABILITY_OUT_OF_STOCK};

/// Availability of one SKU as reported by the inventory endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityState {
    InStock,
    LowStock,
    OutOfStock,
    /// Any label the endpoint reports that is not one of the above
    Unknown,
}

impl AvailabilityState {
    /// Maps an upstream availability label onto a state.
    pub fn from_label(label: &str) -> Self {
        match label {
            AVAILABILITY_IN_STOCK => AvailabilityState::InStock,
            AVAILABILITY_LOW_ON_STOCK => AvailabilityState::LowStock,
            AVAILABILITY_OUT_OF_STOCK => AvailabilityState::OutOfStock,
            _ => AvailabilityState::Unknown,
        }
    }

    /// Whether a SKU in this state can be bought (in stock or low on stock).
    pub fn is_qualifying(self) -> bool {
        matches!(self, AvailabilityState::InStock | AvailabilityState::LowStock)
    }
}

/// SKU to availability mapping produced by one successful poll.
///
/// Never mutated after construction; a monitor replaces its snapshots
/// wholesale on every successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSnapshot {
    skus: BTreeMap<String, AvailabilityState>,
}

impl StockSnapshot {
    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn get(&self, sku: &str) -> Option<AvailabilityState> {
        self.skus.get(sku).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AvailabilityState)> {
        self.skus.iter().map(|(sku, state)| (sku.as_str(), *state))
    }

    /// SKUs that are in stock or low on stock, in SKU order.
    pub fn qualifying_skus(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, state)| state.is_qualifying())
            .map(|(sku, _)| sku)
    }

    /// True if at least one SKU can be bought.
    pub fn has_qualifying_stock(&self) -> bool {
        self.skus.values().any(|state| state.is_qualifying())
    }
}

impl FromIterator<(String, AvailabilityState)> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, AvailabilityState)>>(iter: I) -> Self {
        Self {
            skus: iter.into_iter().collect(),
        }
    }
}

/// Decides whether stock changed between two consecutive successful polls.
///
/// An empty `previous` means no poll has succeeded yet (or the last one
/// reported nothing), and the first observed state always counts as a change.
/// Otherwise any difference in the (SKU, state) pairs is a change: a SKU
/// appearing or disappearing, or moving between any two states.
pub fn changed(previous: &StockSnapshot, current: &StockSnapshot) -> bool {
    if previous.is_empty() {
        return true;
    }
    previous != current
}
