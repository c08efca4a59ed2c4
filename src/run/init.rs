//! Service initialization.
//!
//! This module contains the `init_handler` function which wires settings,
//! the HTTP client, notifier, metadata fetcher and registry together before
//! the command loop begins.

use std::sync::Arc;

use log::info;

use crate::app::CommandHandler;
use crate::config::{Config, Settings};
use crate::error_handling::InitializationError;
use crate::initialization::{init_client, ClientOptions};
use crate::metadata::HtmlMetadataFetcher;
use crate::notify::WebhookNotifier;
use crate::registry::{MonitorRegistry, RegistryOptions, StateStore};

/// Builds the command handler and everything it owns.
///
/// The webhook notifier doubles as the destination directory, so restored
/// monitors are checked against the same destinations notifications go to.
///
/// # Errors
///
/// Returns an error if the shared HTTP client cannot be built.
pub fn init_handler(
    config: &Config,
    settings: &Settings,
) -> Result<CommandHandler, InitializationError> {
    let client = init_client(&ClientOptions::from(config))?;
    let notifier = Arc::new(WebhookNotifier::new(client.clone(), settings));
    let metadata = Arc::new(HtmlMetadataFetcher::new(client));

    let registry = MonitorRegistry::new(
        RegistryOptions::from_config(config, settings.market_id.clone()),
        notifier.clone(),
        StateStore::new(config.state_file.clone()),
    );
    info!(
        "Market {} with {} destination(s); state file {}",
        settings.market_id,
        settings.destinations.len(),
        config.state_file.display()
    );
    Ok(CommandHandler::new(registry, notifier, metadata))
}
