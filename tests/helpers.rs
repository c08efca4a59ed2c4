// Shared test helpers for mocked storefront endpoints and monitor setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Not every test file uses every helper

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stock_monitor::error_handling::NotifyError;
use stock_monitor::initialization::ClientOptions;
use stock_monitor::monitor::Endpoints;
use stock_monitor::notify::{DestinationDirectory, Notification, Notifier, NotifyTarget};
use stock_monitor::stock::ProductIdentity;
use stock_monitor::watch::Schedule;
use stock_monitor::ProductMonitor;

pub const MARKET: &str = "10701";
pub const PRODUCT_NAME: &str = "SATIN MIDI DRESS";

/// Product page URL for product id `n`.
pub fn product_url(n: u32) -> String {
    format!("https://shop.example/pt/pt/satin-dress-p{n}.html?v1={n}")
}

pub fn availability_path(n: u32) -> String {
    format!("/store/{MARKET}/product/id/{n}/availability")
}

pub fn recommendations_path(n: u32) -> String {
    format!("/store/{MARKET}/product/id/{n}/recommendations")
}

/// Availability body with the given `(sku, label)` pairs.
pub fn availability_body(skus: &[(u64, &str)]) -> serde_json::Value {
    let entries: Vec<_> = skus
        .iter()
        .map(|(sku, availability)| json!({ "sku": sku, "availability": availability }))
        .collect();
    json!({ "productId": 1, "skusAvailability": entries })
}

/// Recommendations body listing `PRODUCT_NAME` with sizes for SKUs 101 to 103.
pub fn recommendations_body() -> serde_json::Value {
    json!({
        "recommendations": [
            { "fullResponse": { "name": "OTHER DRESS", "detail": { "colors": [] } } },
            { "fullResponse": {
                "name": PRODUCT_NAME,
                "detail": { "colors": [
                    { "sizes": [ { "sku": 101, "name": "XS" }, { "sku": 102, "name": "S" } ] },
                    { "sizes": [ { "sku": "103", "name": "M" } ] }
                ] }
            } }
        ]
    })
}

/// Serves the availability of product `n` until the server is reset.
pub async fn mount_availability(server: &MockServer, n: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(availability_path(n)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_recommendations(server: &MockServer, n: u32) {
    Mock::given(method("GET"))
        .and(path(recommendations_path(n)))
        .respond_with(ResponseTemplate::new(200).set_body_json(recommendations_body()))
        .mount(server)
        .await;
}

pub fn client_options() -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

pub fn fast_schedule() -> Schedule {
    Schedule {
        poll_interval: Duration::from_millis(20),
        cooldown: Duration::from_millis(300),
    }
}

pub fn monitor(server: &MockServer, n: u32) -> Arc<ProductMonitor> {
    let identity = ProductIdentity::parse(&product_url(n), MARKET).expect("valid product url");
    Arc::new(ProductMonitor::new(
        identity,
        PRODUCT_NAME,
        Endpoints::new(server.uri()),
        client_options(),
    ))
}

/// Notifier that keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, Notification)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        destination: &str,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), notification.clone()));
        Ok(())
    }
}

/// Knows destination "restocks" with role "42".
pub struct StaticDirectory;

impl DestinationDirectory for StaticDirectory {
    fn has_destination(&self, destination: &str) -> bool {
        destination == "restocks"
    }

    fn resolve_notify_target(&self, destination: &str, target_id: &str) -> Option<NotifyTarget> {
        (destination == "restocks" && target_id == "42").then(|| NotifyTarget::role(target_id))
    }
}
