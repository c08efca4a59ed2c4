//! Notification delivery seams.
//!
//! The monitoring core never talks to a chat platform directly. It needs two
//! capabilities from its host:
//! - `Notifier`: deliver a rendered `Notification` to a destination
//! - `DestinationDirectory`: tell whether a destination and a notify target
//!   still exist (used when restoring persisted monitors)

mod webhook;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::SIZES_UNAVAILABLE_PLACEHOLDER;
use crate::error_handling::NotifyError;

pub use webhook::WebhookNotifier;

/// Who gets mentioned when a product restocks (e.g. a chat role).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NotifyTarget {
    /// Stable id, persisted with the monitor
    pub id: String,
    /// How the target is addressed in a message, e.g. `<@&1360676493960806490>`
    pub mention: String,
}

impl NotifyTarget {
    /// A chat role, mentioned as `<@&id>`.
    pub fn role(id: impl Into<String>) -> Self {
        let id = id.into();
        let mention = format!("<@&{id}>");
        Self { id, mention }
    }
}

/// Structured restock notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub url: String,
    pub price: Option<String>,
    /// "In Stock" / "Out of Stock"
    pub status: String,
    /// Display sizes of the SKUs that can be bought
    pub sizes: Vec<String>,
    pub image: Option<String>,
    pub mention: NotifyTarget,
}

impl Notification {
    /// Sizes as an indented list, one per line, or a placeholder when none
    /// of the available SKUs resolved to a size.
    pub fn sizes_text(&self) -> String {
        if self.sizes.is_empty() {
            return format!("    {SIZES_UNAVAILABLE_PLACEHOLDER}");
        }
        self.sizes
            .iter()
            .map(|size| format!("    {size}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Delivers notifications to destinations.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        destination: &str,
        notification: &Notification,
    ) -> Result<(), NotifyError>;
}

/// Resolves persisted destination and notify-target ids against the
/// current process context.
pub trait DestinationDirectory: Send + Sync {
    /// Whether messages can still be delivered to `destination`.
    fn has_destination(&self, destination: &str) -> bool;

    /// Looks up a notify target within `destination`.
    fn resolve_notify_target(&self, destination: &str, target_id: &str) -> Option<NotifyTarget>;
}
