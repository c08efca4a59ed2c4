//! Registry entries and their projections.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error_handling::PollSummary;
use crate::monitor::ProductMonitor;
use crate::notify::NotifyTarget;
use crate::stock::ProductIdentity;
use crate::watch::{DisplayInfo, WatchState, WatchTask};

/// Stable identifier of a registry entry.
///
/// Unlike the 1-based listing index, it never shifts when other entries are
/// removed. Ids grow with registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub(crate) u64);

impl std::fmt::Display for MonitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One monitored product at one destination.
///
/// Owns the monitor and the task polling it; dropping or unregistering the
/// entry stops both.
pub struct MonitorEntry {
    pub id: MonitorId,
    pub destination: String,
    pub identity: ProductIdentity,
    pub display: DisplayInfo,
    pub notify_target: NotifyTarget,
    pub registered_at: DateTime<Utc>,
    pub monitor: Arc<ProductMonitor>,
    pub task: WatchTask,
}

impl MonitorEntry {
    pub fn record(&self) -> PersistedMonitorRecord {
        PersistedMonitorRecord {
            destination_id: self.destination.clone(),
            url: self.identity.url().to_string(),
            display_name: self.display.name.clone(),
            display_price: self.display.price.clone(),
            notify_target_id: self.notify_target.id.clone(),
            image_link: self.display.image_link.clone(),
        }
    }

    /// Read-only view of the entry at listing position `index` (1-based).
    pub fn summary(&self, index: usize) -> EntrySummary {
        EntrySummary {
            index,
            id: self.id,
            url: self.identity.url().to_string(),
            display_name: self.display.name.clone(),
            display_price: self.display.price.clone(),
            notify_target: self.notify_target.id.clone(),
            in_stock: self.monitor.current_snapshot().has_qualifying_stock(),
            polls: self.monitor.stats().summary(),
            state: self.task.state(),
            registered_at: self.registered_at,
        }
    }
}

impl std::fmt::Debug for MonitorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorEntry")
            .field("id", &self.id)
            .field("destination", &self.destination)
            .field("url", &self.identity.url())
            .field("state", &self.task.state())
            .finish()
    }
}

/// What survives a restart: identity and display metadata only.
///
/// Sessions, snapshots and size mappings are rebuilt on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMonitorRecord {
    pub destination_id: String,
    pub url: String,
    pub display_name: String,
    #[serde(default)]
    pub display_price: Option<String>,
    pub notify_target_id: String,
    #[serde(default)]
    pub image_link: Option<String>,
}

/// Listing row for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    /// 1-based position in the destination's listing
    pub index: usize,
    pub id: MonitorId,
    pub url: String,
    pub display_name: String,
    pub display_price: Option<String>,
    pub notify_target: String,
    /// Whether the last successful poll saw stock
    pub in_stock: bool,
    pub polls: PollSummary,
    pub state: WatchState,
    pub registered_at: DateTime<Utc>,
}

/// Listing row plus the sizes currently available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub summary: EntrySummary,
    pub sizes: Vec<String>,
}
