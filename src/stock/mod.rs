//! Stock data model.
//!
//! Pure data and comparison logic, no I/O:
//! - Product identity (URL-keyed)
//! - Availability snapshots and the change rule between two polls
//! - SKU to size mappings and their cache state

mod identity;
mod sizes;
mod snapshot;

// Re-export public API
pub use identity::ProductIdentity;
pub use sizes::{qualifying_sizes, SizeCache, SizeMapping};
pub use snapshot::{changed, AvailabilityState, StockSnapshot};
