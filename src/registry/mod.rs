//! Monitor registry.
//!
//! Owns every monitored product, grouped by destination, and keeps the state
//! file in sync with it. The registry is the only place that creates or
//! stops watch tasks and closes monitors.
//!
//! All mutation goes through `&mut self`, so the single owner (the command
//! loop) serializes registrations and removals without locks. Watch tasks
//! never see the registry.

mod entry;
mod store;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::config::Config;
use crate::error_handling::{IdentityError, RegistryError};
use crate::initialization::ClientOptions;
use crate::monitor::{Endpoints, ProductMonitor};
use crate::notify::{DestinationDirectory, Notifier, NotifyTarget};
use crate::stock::{qualifying_sizes, ProductIdentity};
use crate::watch::{Delivery, DisplayInfo, Schedule, WatchTask};

pub use entry::{EntrySummary, MonitorEntry, MonitorId, PersistedMonitorRecord, StatusReport};
pub use store::StateStore;

/// Everything the registry needs to build monitors.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Store/region id resolved from settings, used for every new identity
    pub market_id: String,
    pub endpoints: Endpoints,
    pub client_options: ClientOptions,
    pub schedule: Schedule,
}

impl RegistryOptions {
    pub fn from_config(config: &Config, market_id: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            endpoints: Endpoints::new(config.api_base.clone()),
            client_options: ClientOptions::from(config),
            schedule: Schedule::from(config),
        }
    }
}

/// Multiplexes monitored products across destinations.
pub struct MonitorRegistry {
    options: RegistryOptions,
    notifier: Arc<dyn Notifier>,
    store: StateStore,
    // destination -> entries in registration order; keys never map to empty lists
    destinations: HashMap<String, Vec<MonitorEntry>>,
    next_id: u64,
}

impl MonitorRegistry {
    pub fn new(options: RegistryOptions, notifier: Arc<dyn Notifier>, store: StateStore) -> Self {
        Self {
            options,
            notifier,
            store,
            destinations: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Builds an identity for `url` in the configured market.
    pub fn identity_for(&self, url: &str) -> Result<ProductIdentity, IdentityError> {
        ProductIdentity::parse(url, &self.options.market_id)
    }

    /// Starts monitoring a product at a destination.
    ///
    /// Builds the monitor, prefetches its size mapping, starts its watch task
    /// and rewrites the state file.
    ///
    /// # Errors
    ///
    /// `RegistryError::DuplicateMonitor` if the destination already monitors
    /// this URL. Nothing is created in that case.
    pub async fn register(
        &mut self,
        destination: &str,
        identity: ProductIdentity,
        display: DisplayInfo,
        notify_target: NotifyTarget,
    ) -> Result<EntrySummary, RegistryError> {
        let summary = self
            .create_entry(destination, identity, display, notify_target)
            .await?;
        info!(
            "Started monitoring {} for {} ({})",
            summary.url, destination, summary.id
        );
        self.persist().await;
        Ok(summary)
    }

    /// Stops the entry at 1-based `index` in the destination's listing.
    ///
    /// The watch task is cancelled and awaited, then the monitor is closed,
    /// then the state file is rewritten. Later entries move up one position.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidIndex` if `index` is outside `1..=len`; the
    /// registry is unchanged.
    pub async fn unregister(
        &mut self,
        destination: &str,
        index: usize,
    ) -> Result<MonitorEntry, RegistryError> {
        let len = self.entries(destination).len();
        if index == 0 || index > len {
            return Err(RegistryError::InvalidIndex { index, len });
        }
        let id = self.entries(destination)[index - 1].id;
        self.unregister_id(id)
            .await
            .ok_or(RegistryError::InvalidIndex { index, len })
    }

    /// Stops the entry with the given stable id, wherever it is listed.
    pub async fn unregister_id(&mut self, id: MonitorId) -> Option<MonitorEntry> {
        let destination = self
            .destinations
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| e.id == id))
            .map(|(destination, _)| destination.clone())?;

        let entries = self.destinations.get_mut(&destination)?;
        let position = entries.iter().position(|e| e.id == id)?;
        let mut entry = entries.remove(position);
        if entries.is_empty() {
            self.destinations.remove(&destination);
        }

        stop_entry(&mut entry).await;
        info!(
            "Stopped monitoring {} for {} ({})",
            entry.identity.url(),
            destination,
            entry.id
        );
        self.persist().await;
        Some(entry)
    }

    /// Listing of a destination in registration order, numbered from 1.
    pub fn list(&self, destination: &str) -> Vec<EntrySummary> {
        self.entries(destination)
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.summary(i + 1))
            .collect()
    }

    /// Listing plus available sizes, from each monitor's last successful poll.
    ///
    /// Does not poll: a second concurrent poll would interleave with the
    /// watch task's own snapshot updates. Does not wait for a size lookup
    /// in flight either; such a monitor reports no sizes yet.
    pub fn status(&self, destination: &str) -> Vec<StatusReport> {
        let mut reports = Vec::new();
        for (i, entry) in self.entries(destination).iter().enumerate() {
            let snapshot = entry.monitor.current_snapshot();
            let sizes = entry
                .monitor
                .size_cache()
                .mapping()
                .map(|mapping| qualifying_sizes(&snapshot, mapping))
                .unwrap_or_default();
            reports.push(StatusReport {
                summary: entry.summary(i + 1),
                sizes,
            });
        }
        reports
    }

    pub fn entries(&self, destination: &str) -> &[MonitorEntry] {
        self.destinations
            .get(destination)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Destinations with at least one entry.
    pub fn destinations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.destinations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of entries across destinations.
    pub fn len(&self) -> usize {
        self.destinations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Persisted records of all entries, in registration order.
    pub fn records(&self) -> Vec<PersistedMonitorRecord> {
        let mut entries: Vec<&MonitorEntry> = self.destinations.values().flatten().collect();
        entries.sort_by_key(|entry| entry.id);
        entries.iter().map(|entry| entry.record()).collect()
    }

    /// Rebuilds entries from the state file.
    ///
    /// Records whose destination or notify target no longer resolves, whose
    /// URL no longer parses, or that duplicate an earlier record are skipped
    /// and not retried. The state file is rewritten afterwards to match.
    ///
    /// # Returns
    ///
    /// The number of entries restored.
    pub async fn restore(&mut self, directory: &dyn DestinationDirectory) -> usize {
        let records = match self.store.load().await {
            Ok(records) => records,
            Err(e) => {
                error!(
                    "Failed to read monitor state from {}: {}",
                    self.store.path().display(),
                    e
                );
                return 0;
            }
        };

        let total = records.len();
        let mut restored = 0;
        for record in records {
            if !directory.has_destination(&record.destination_id) {
                debug!(
                    "Skipping {}: destination {} is gone",
                    record.url, record.destination_id
                );
                continue;
            }
            let Some(target) =
                directory.resolve_notify_target(&record.destination_id, &record.notify_target_id)
            else {
                debug!(
                    "Skipping {}: notify target {} is gone",
                    record.url, record.notify_target_id
                );
                continue;
            };
            let identity = match self.identity_for(&record.url) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("Skipping persisted monitor: {}", e);
                    continue;
                }
            };
            let display = DisplayInfo {
                name: record.display_name,
                price: record.display_price,
                image_link: record.image_link,
            };
            match self
                .create_entry(&record.destination_id, identity, display, target)
                .await
            {
                Ok(_) => restored += 1,
                Err(e) => warn!("Skipping persisted monitor: {}", e),
            }
        }

        info!("Restored {} of {} persisted monitors", restored, total);
        if restored != total {
            self.persist().await;
        }
        restored
    }

    /// Stops every entry without touching the state file, so the same set
    /// is restored on the next start.
    pub async fn shutdown(&mut self) {
        let count = self.len();
        for (_, mut entries) in self.destinations.drain() {
            for entry in entries.iter_mut() {
                entry.task.cancel();
            }
            for entry in entries.iter_mut() {
                stop_entry(entry).await;
            }
        }
        info!("Registry shut down ({} monitors stopped)", count);
    }

    async fn create_entry(
        &mut self,
        destination: &str,
        identity: ProductIdentity,
        display: DisplayInfo,
        notify_target: NotifyTarget,
    ) -> Result<EntrySummary, RegistryError> {
        if self
            .entries(destination)
            .iter()
            .any(|entry| entry.identity == identity)
        {
            return Err(RegistryError::DuplicateMonitor {
                destination: destination.to_string(),
                url: identity.url().to_string(),
            });
        }

        let monitor = Arc::new(ProductMonitor::new(
            identity.clone(),
            display.name.clone(),
            self.options.endpoints.clone(),
            self.options.client_options.clone(),
        ));
        monitor.initialize().await;

        let delivery = Delivery {
            destination: destination.to_string(),
            notify_target: notify_target.clone(),
            display: display.clone(),
        };
        let task = WatchTask::spawn(
            Arc::clone(&monitor),
            Arc::clone(&self.notifier),
            delivery,
            self.options.schedule,
        );

        let id = MonitorId(self.next_id);
        self.next_id += 1;

        let entries = self.destinations.entry(destination.to_string()).or_default();
        entries.push(MonitorEntry {
            id,
            destination: destination.to_string(),
            identity,
            display,
            notify_target,
            registered_at: Utc::now(),
            monitor,
            task,
        });
        let index = entries.len();
        Ok(entries[index - 1].summary(index))
    }

    async fn persist(&self) {
        let records = self.records();
        match self.store.save(&records).await {
            Ok(()) => debug!(
                "Saved {} monitors to {}",
                records.len(),
                self.store.path().display()
            ),
            Err(e) => error!(
                "Failed to save monitor state to {} (monitoring continues in memory): {}",
                self.store.path().display(),
                e
            ),
        }
    }
}

async fn stop_entry(entry: &mut MonitorEntry) {
    entry.task.cancel();
    entry.task.wait().await;
    entry.monitor.close().await;
}
