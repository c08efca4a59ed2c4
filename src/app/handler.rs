//! Command dispatch.
//!
//! `CommandHandler` is the single owner of the monitor registry. It resolves
//! user input against the destination directory, fetches display metadata on
//! registration and turns registry results into reply text.

use std::sync::Arc;

use log::{info, warn};

use super::commands::{help_text, Command};
use super::reply;
use crate::error_handling::{CommandError, RegistryError};
use crate::metadata::MetadataFetcher;
use crate::notify::DestinationDirectory;
use crate::registry::{EntrySummary, MonitorRegistry, StatusReport};
use crate::watch::DisplayInfo;

/// Result of a `stop` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// No index given: the current listing, so the user can pick one
    Listing(Vec<EntrySummary>),
    Stopped(EntrySummary),
}

pub struct CommandHandler {
    registry: MonitorRegistry,
    directory: Arc<dyn DestinationDirectory>,
    metadata: Arc<dyn MetadataFetcher>,
}

impl CommandHandler {
    pub fn new(
        registry: MonitorRegistry,
        directory: Arc<dyn DestinationDirectory>,
        metadata: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            registry,
            directory,
            metadata,
        }
    }

    pub fn registry(&self) -> &MonitorRegistry {
        &self.registry
    }

    /// Restores persisted monitors against the current destinations.
    pub async fn restore(&mut self) -> usize {
        self.registry.restore(self.directory.as_ref()).await
    }

    /// Starts monitoring `url` at `destination`.
    ///
    /// The URL and notify target are validated and duplicates rejected before
    /// the product page is fetched, so a rejected command costs no request.
    pub async fn start_monitor(
        &mut self,
        destination: &str,
        url: &str,
        notify_target: &str,
        image_link: Option<String>,
    ) -> Result<EntrySummary, CommandError> {
        if !self.directory.has_destination(destination) {
            return Err(CommandError::UnknownDestination(destination.to_string()));
        }
        let target = self
            .directory
            .resolve_notify_target(destination, notify_target)
            .ok_or_else(|| CommandError::UnknownNotifyTarget(notify_target.to_string()))?;
        let identity = self.registry.identity_for(url)?;
        if self
            .registry
            .entries(destination)
            .iter()
            .any(|entry| entry.identity == identity)
        {
            return Err(RegistryError::DuplicateMonitor {
                destination: destination.to_string(),
                url: identity.url().to_string(),
            }
            .into());
        }

        let metadata = self
            .metadata
            .fetch_product_metadata(identity.url())
            .await
            .inspect_err(|e| warn!("Metadata fetch for {} failed: {}", identity.url(), e))?;
        let display = DisplayInfo {
            name: metadata.name,
            price: metadata.price,
            image_link,
        };
        Ok(self
            .registry
            .register(destination, identity, display, target)
            .await?)
    }

    /// Stops the monitor at 1-based `index`, or lists monitors when no index
    /// is given or the destination has none.
    pub async fn stop_monitor(
        &mut self,
        destination: &str,
        index: Option<usize>,
    ) -> Result<StopOutcome, CommandError> {
        let listing = self.registry.list(destination);
        // With nothing monitored any number is out of range; show the empty listing
        let Some(index) = index.filter(|_| !listing.is_empty()) else {
            return Ok(StopOutcome::Listing(listing));
        };
        let entry = self.registry.unregister(destination, index).await?;
        Ok(StopOutcome::Stopped(entry.summary(index)))
    }

    /// Status of every monitor at `destination`, from the last polls.
    pub fn list_status(&self, destination: &str) -> Vec<StatusReport> {
        self.registry.status(destination)
    }

    /// Runs a command and renders the reply.
    ///
    /// Errors are rendered too: no command failure ends the session. `Quit`
    /// is handled by the caller and only acknowledged here.
    pub async fn execute(&mut self, command: Command) -> String {
        let result = match command {
            Command::Start {
                destination,
                url,
                notify_target,
                image_link,
            } => self
                .start_monitor(&destination, &url, &notify_target, image_link)
                .await
                .map(|summary| reply::started(&summary)),
            Command::Stop { destination, index } => self
                .stop_monitor(&destination, index)
                .await
                .map(|outcome| match outcome {
                    StopOutcome::Listing(entries) => reply::listing(&destination, &entries),
                    StopOutcome::Stopped(summary) => reply::stopped(&summary),
                }),
            Command::Status { destination } => {
                let reports = self.list_status(&destination);
                Ok(reply::status(&destination, &reports))
            }
            Command::Help => Ok(help_text()),
            Command::Quit => Ok("Shutting down".to_string()),
        };
        result.unwrap_or_else(|e| {
            info!("Command rejected: {}", e);
            e.to_string()
        })
    }

    /// Stops every monitor, leaving the state file as it is.
    pub async fn shutdown(mut self) -> usize {
        let count = self.registry.len();
        self.registry.shutdown().await;
        count
    }
}
