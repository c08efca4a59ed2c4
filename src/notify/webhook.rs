//! Chat webhook notifier.
//!
//! Posts an embed-style JSON message to the incoming-webhook URL configured
//! for each destination in the settings file.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::info;
use serde::Serialize;

use super::{DestinationDirectory, Notification, Notifier, NotifyTarget};
use crate::config::{DestinationSettings, Settings, NOTIFICATION_COLOR};
use crate::error_handling::NotifyError;

#[derive(Debug, Serialize)]
struct WebhookMessage {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    color: u32,
    timestamp: String,
    fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedImage {
    url: String,
}

fn field(name: &str, value: impl Into<String>) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.into(),
        inline: false,
    }
}

impl From<&Notification> for WebhookMessage {
    fn from(n: &Notification) -> Self {
        let mut fields = vec![field("Product", n.url.clone())];
        if let Some(price) = &n.price {
            fields.push(field("Price", price.clone()));
        }
        fields.push(field("Status", n.status.clone()));
        fields.push(field("Current Stock", n.sizes_text()));

        WebhookMessage {
            content: n.mention.mention.clone(),
            embeds: vec![Embed {
                title: n.title.clone(),
                url: n.url.clone(),
                color: NOTIFICATION_COLOR,
                timestamp: chrono::Utc::now().to_rfc3339(),
                fields,
                image: n.image.clone().map(|url| EmbedImage { url }),
            }],
        }
    }
}

/// Delivers notifications through per-destination webhooks.
///
/// Also serves as the destination directory: a destination exists iff it is
/// configured, and a notify target exists iff it is one of that
/// destination's roles.
pub struct WebhookNotifier {
    client: reqwest::Client,
    destinations: BTreeMap<String, DestinationSettings>,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, settings: &Settings) -> Self {
        Self {
            client,
            destinations: settings.destinations.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        destination: &str,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let hook = self
            .destinations
            .get(destination)
            .ok_or_else(|| NotifyError::UnknownDestination(destination.to_string()))?;

        let response = self
            .client
            .post(&hook.webhook_url)
            .json(&WebhookMessage::from(notification))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        info!("Notified {} about {}", destination, notification.url);
        Ok(())
    }
}

impl DestinationDirectory for WebhookNotifier {
    fn has_destination(&self, destination: &str) -> bool {
        self.destinations.contains_key(destination)
    }

    fn resolve_notify_target(&self, destination: &str, target_id: &str) -> Option<NotifyTarget> {
        self.destinations
            .get(destination)?
            .roles
            .iter()
            .find(|role| role.as_str() == target_id)
            .map(|role| NotifyTarget::role(role.clone()))
    }
}
