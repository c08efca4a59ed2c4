//! Settings file loading.
//!
//! The settings file is a small JSON document holding what the CLI does not:
//! the storefront market and the notification destinations.
//!
//! ```json
//! {
//!   "market_id": "10701",
//!   "destinations": {
//!     "restocks": { "webhook_url": "https://chat.example/hooks/1", "roles": ["1360676493960806490"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error_handling::InitializationError;

/// A notification destination the binary can deliver to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSettings {
    /// Incoming-webhook URL messages are posted to
    pub webhook_url: String,
    /// Role ids that may be mentioned in this destination
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Contents of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Storefront region/store id used in every inventory request
    pub market_id: String,
    #[serde(default)]
    pub destinations: BTreeMap<String, DestinationSettings>,
}

impl Settings {
    /// Reads and parses the settings file.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::SettingsError` if the file cannot be read,
    /// is not valid JSON, or has an empty `market_id`.
    pub async fn load(path: &Path) -> Result<Self, InitializationError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            InitializationError::SettingsError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw).map_err(|e| {
            InitializationError::SettingsError(format!("{}: {e}", path.display()))
        })
    }

    fn from_json(raw: &str) -> Result<Self, String> {
        let settings: Settings = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        if settings.market_id.trim().is_empty() {
            return Err("`market_id` must not be empty".to_string());
        }
        Ok(settings)
    }
}
