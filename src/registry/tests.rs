// Registry module tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error_handling::NotifyError;
use crate::notify::Notification;
use crate::stock::SizeCache;
use crate::watch::WatchState;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
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

/// Knows destination "restocks" with role "42" only.
struct Directory;

impl DestinationDirectory for Directory {
    fn has_destination(&self, destination: &str) -> bool {
        destination == "restocks"
    }

    fn resolve_notify_target(&self, destination: &str, target_id: &str) -> Option<NotifyTarget> {
        (destination == "restocks" && target_id == "42").then(|| NotifyTarget::role(target_id))
    }
}

fn options(api_base: &str) -> RegistryOptions {
    RegistryOptions {
        market_id: "10701".to_string(),
        endpoints: Endpoints::new(api_base),
        client_options: ClientOptions {
            timeout: Duration::from_secs(2),
            ..Default::default()
        },
        schedule: Schedule {
            poll_interval: Duration::from_millis(20),
            cooldown: Duration::from_millis(200),
        },
    }
}

fn display(name: &str) -> DisplayInfo {
    DisplayInfo {
        name: name.to_string(),
        price: Some("29,95 EUR".to_string()),
        image_link: None,
    }
}

fn url(n: u32) -> String {
    format!("https://shop.example/pt/pt/item-{n}.html?v1={n}")
}

// The mock server answers nothing (404), so monitors run but never see stock
async fn registry(dir: &TempDir) -> (MonitorRegistry, MockServer) {
    let server = MockServer::start().await;
    let registry = MonitorRegistry::new(
        options(&server.uri()),
        Arc::new(RecordingNotifier::default()),
        StateStore::new(dir.path().join("monitors.json")),
    );
    (registry, server)
}

async fn register(registry: &mut MonitorRegistry, destination: &str, n: u32) -> EntrySummary {
    let identity = registry.identity_for(&url(n)).unwrap();
    registry
        .register(destination, identity, display(&format!("ITEM {n}")), NotifyTarget::role("42"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_lists_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;

    let first = register(&mut registry, "restocks", 1).await;
    let second = register(&mut registry, "restocks", 2).await;

    assert_eq!(first.index, 1);
    assert_eq!(second.index, 2);
    assert!(first.id < second.id);

    let listing = registry.list("restocks");
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].url, url(1));
    assert_eq!(listing[1].url, url(2));
    assert_eq!(listing[0].state, WatchState::Running);
    assert!(registry.list("elsewhere").is_empty());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_url_is_rejected_per_destination() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;

    register(&mut registry, "restocks", 1).await;
    let identity = registry.identity_for(&url(1)).unwrap();
    let err = registry
        .register("restocks", identity, display("ITEM 1"), NotifyTarget::role("42"))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateMonitor { .. }));
    assert_eq!(registry.list("restocks").len(), 1);

    // Same URL at another destination is a separate monitor
    register(&mut registry, "other", 1).await;
    assert_eq!(registry.len(), 2);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_unregister_out_of_range_leaves_registry_unchanged() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    register(&mut registry, "restocks", 1).await;
    register(&mut registry, "restocks", 2).await;

    for index in [0, 3, 100] {
        let err = registry.unregister("restocks", index).await.unwrap_err();
        assert_eq!(err, RegistryError::InvalidIndex { index, len: 2 });
    }
    assert!(matches!(
        registry.unregister("nowhere", 1).await,
        Err(RegistryError::InvalidIndex { index: 1, len: 0 })
    ));
    assert_eq!(registry.list("restocks").len(), 2);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_unregister_renumbers_remaining_entries() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    for n in 1..=3 {
        register(&mut registry, "restocks", n).await;
    }

    let removed = registry.unregister("restocks", 1).await.unwrap();
    assert_eq!(removed.identity.url(), url(1));
    assert_eq!(removed.task.state(), WatchState::Cancelled);
    assert!(removed.monitor.is_closed());

    let listing = registry.list("restocks");
    assert_eq!(listing.len(), 2);
    assert_eq!((listing[0].index, listing[0].url.as_str()), (1, url(2).as_str()));
    assert_eq!((listing[1].index, listing[1].url.as_str()), (2, url(3).as_str()));

    registry.shutdown().await;
}

#[tokio::test]
async fn test_empty_destination_is_removed() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    register(&mut registry, "restocks", 1).await;
    assert_eq!(registry.destinations(), vec!["restocks"]);

    registry.unregister("restocks", 1).await.unwrap();
    assert!(registry.destinations().is_empty());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_unregister_by_stable_id() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    register(&mut registry, "restocks", 1).await;
    let second = register(&mut registry, "restocks", 2).await;
    register(&mut registry, "restocks", 3).await;

    let removed = registry.unregister_id(second.id).await.unwrap();
    assert_eq!(removed.identity.url(), url(2));
    assert!(registry.unregister_id(second.id).await.is_none());
    assert_eq!(registry.list("restocks").len(), 2);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_state_file_tracks_registrations() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    let store = StateStore::new(dir.path().join("monitors.json"));

    register(&mut registry, "restocks", 1).await;
    register(&mut registry, "restocks", 2).await;
    let records = store.load().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, url(1));
    assert_eq!(records[0].notify_target_id, "42");
    assert_eq!(records[0].display_price.as_deref(), Some("29,95 EUR"));

    registry.unregister("restocks", 1).await.unwrap();
    let records = store.load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, url(2));

    // Shutdown keeps the file so the set comes back on restart
    registry.shutdown().await;
    assert_eq!(store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_restore_skips_unresolvable_records() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(dir.path().join("monitors.json"));
    let record = |destination: &str, n: u32, target: &str| PersistedMonitorRecord {
        destination_id: destination.to_string(),
        url: url(n),
        display_name: format!("ITEM {n}"),
        display_price: None,
        notify_target_id: target.to_string(),
        image_link: None,
    };
    store
        .save(&[
            record("restocks", 1, "42"),
            record("gone", 2, "42"),     // destination no longer exists
            record("restocks", 3, "7"),  // role no longer exists
            record("restocks", 4, "42"),
            record("restocks", 4, "42"), // duplicate
        ])
        .await
        .unwrap();

    let (mut registry, _server) = registry(&dir).await;
    let restored = registry.restore(&Directory).await;

    assert_eq!(restored, 2);
    let listing = registry.list("restocks");
    assert_eq!(listing[0].url, url(1));
    assert_eq!(listing[1].url, url(4));
    assert_eq!(registry.entries("restocks")[0].notify_target.mention, "<@&42>");

    // Skipped records are dropped from the file, not retried
    let urls: Vec<String> = store.load().await.unwrap().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec![url(1), url(4)]);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_restore_from_corrupt_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("monitors.json"), "not json").unwrap();

    let (mut registry, _server) = registry(&dir).await;
    assert_eq!(registry.restore(&Directory).await, 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_status_without_data() {
    let dir = TempDir::new().unwrap();
    let (mut registry, _server) = registry(&dir).await;
    register(&mut registry, "restocks", 1).await;

    let reports = registry.status("restocks");
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].summary.in_stock);
    assert!(reports[0].sizes.is_empty());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_status_does_not_wait_for_size_lookup() {
    let dir = TempDir::new().unwrap();
    let (mut registry, server) = registry(&dir).await;
    Mock::given(method("GET"))
        .and(path("/store/10701/product/id/1/recommendations"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    register(&mut registry, "restocks", 1).await;
    assert_eq!(
        registry.entries("restocks")[0].monitor.size_cache(),
        SizeCache::Failed
    );

    // The watch task is now retrying the lookup
    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = Instant::now();
    let reports = registry.status("restocks");
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(reports.len(), 1);
    assert!(reports[0].sizes.is_empty());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_unwritable_state_file_keeps_monitoring() {
    let dir = TempDir::new().unwrap();
    // A non-empty directory cannot be replaced by the state file
    let state_path = dir.path().join("state");
    std::fs::create_dir(&state_path).unwrap();
    std::fs::write(state_path.join("keep"), "x").unwrap();
    let server = MockServer::start().await;
    let mut registry = MonitorRegistry::new(
        options(&server.uri()),
        Arc::new(RecordingNotifier::default()),
        StateStore::new(&state_path),
    );

    register(&mut registry, "restocks", 1).await;
    register(&mut registry, "restocks", 2).await;
    assert_eq!(registry.list("restocks").len(), 2);
    assert_eq!(registry.list("restocks")[0].state, WatchState::Running);

    let removed = registry.unregister("restocks", 1).await.unwrap();
    assert_eq!(removed.identity.url(), url(1));
    let listing = registry.list("restocks");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].url, url(2));
    assert!(state_path.join("keep").exists());

    registry.shutdown().await;
}
