// Command layer tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

use super::*;
use crate::error_handling::{CommandError, MetadataError, NotifyError, RegistryError};
use crate::initialization::ClientOptions;
use crate::metadata::{MetadataFetcher, ProductMetadata};
use crate::monitor::Endpoints;
use crate::notify::{DestinationDirectory, Notification, Notifier, NotifyTarget};
use crate::registry::{MonitorRegistry, RegistryOptions, StateStore};
use crate::watch::Schedule;

struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn notify(&self, _: &str, _: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

struct Directory;

impl DestinationDirectory for Directory {
    fn has_destination(&self, destination: &str) -> bool {
        destination == "restocks"
    }

    fn resolve_notify_target(&self, destination: &str, target_id: &str) -> Option<NotifyTarget> {
        (destination == "restocks" && target_id == "42").then(|| NotifyTarget::role(target_id))
    }
}

#[derive(Default)]
struct FakeMetadata {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl MetadataFetcher for FakeMetadata {
    async fn fetch_product_metadata(&self, _url: &str) -> Result<ProductMetadata, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MetadataError::Status(404));
        }
        Ok(ProductMetadata {
            name: "SATIN MIDI DRESS".into(),
            price: Some("39,95 EUR".into()),
        })
    }
}

struct Fixture {
    handler: CommandHandler,
    metadata: Arc<FakeMetadata>,
    _server: MockServer,
    _dir: TempDir,
}

async fn fixture(fail_metadata: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let options = RegistryOptions {
        market_id: "10701".into(),
        endpoints: Endpoints::new(server.uri()),
        client_options: ClientOptions {
            timeout: Duration::from_secs(2),
            ..Default::default()
        },
        schedule: Schedule {
            poll_interval: Duration::from_millis(20),
            cooldown: Duration::from_millis(200),
        },
    };
    let registry = MonitorRegistry::new(
        options,
        Arc::new(SilentNotifier),
        StateStore::new(dir.path().join("monitors.json")),
    );
    let metadata = Arc::new(FakeMetadata {
        fail: fail_metadata,
        ..Default::default()
    });
    let handler = CommandHandler::new(registry, Arc::new(Directory), metadata.clone());
    Fixture {
        handler,
        metadata,
        _server: server,
        _dir: dir,
    }
}

fn url(n: u32) -> String {
    format!("https://shop.example/pt/pt/item-{n}.html?v1={n}")
}

fn start(n: u32) -> Command {
    Command::Start {
        destination: "restocks".into(),
        url: url(n),
        notify_target: "42".into(),
        image_link: None,
    }
}

#[tokio::test]
async fn test_start_monitor_uses_fetched_metadata() {
    let mut f = fixture(false).await;
    let summary = f
        .handler
        .start_monitor("restocks", &url(1), "42", Some("https://img.example/1.jpg".into()))
        .await
        .unwrap();

    assert_eq!(summary.index, 1);
    assert_eq!(summary.display_name, "SATIN MIDI DRESS");
    assert_eq!(summary.display_price.as_deref(), Some("39,95 EUR"));
    let entry = &f.handler.registry().entries("restocks")[0];
    assert_eq!(entry.display.image_link.as_deref(), Some("https://img.example/1.jpg"));
    assert_eq!(entry.notify_target.mention, "<@&42>");

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_start_rejections_skip_metadata_fetch() {
    let mut f = fixture(false).await;

    let err = f
        .handler
        .start_monitor("elsewhere", &url(1), "42", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::UnknownDestination(ref d) if d == "elsewhere"));

    let err = f
        .handler
        .start_monitor("restocks", &url(1), "7", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::UnknownNotifyTarget(ref t) if t == "7"));

    let err = f
        .handler
        .start_monitor("restocks", "https://shop.example/item.html", "42", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::Identity(_)));

    assert_eq!(f.metadata.calls.load(Ordering::SeqCst), 0);
    assert!(f.handler.registry().is_empty());
}

#[tokio::test]
async fn test_duplicate_start_is_rejected() {
    let mut f = fixture(false).await;
    assert_eq!(
        f.handler.execute(start(1)).await,
        format!("Started monitoring product: {}", url(1))
    );
    assert_eq!(
        f.handler.execute(start(1)).await,
        format!("This product is already being monitored: {}", url(1))
    );

    assert_eq!(f.metadata.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.handler.registry().len(), 1);

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_metadata_failure_registers_nothing() {
    let mut f = fixture(true).await;
    let reply = f.handler.execute(start(1)).await;

    assert_eq!(
        reply,
        "Error starting monitor: product page returned HTTP 404"
    );
    assert!(f.handler.registry().is_empty());
}

#[tokio::test]
async fn test_stop_without_index_lists() {
    let mut f = fixture(false).await;
    f.handler.execute(start(1)).await;
    f.handler.execute(start(2)).await;

    let outcome = f.handler.stop_monitor("restocks", None).await.unwrap();
    let StopOutcome::Listing(entries) = outcome else {
        panic!("expected a listing");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(f.handler.registry().len(), 2);

    let reply = f
        .handler
        .execute(Command::Stop {
            destination: "restocks".into(),
            index: None,
        })
        .await;
    assert!(reply.contains(&format!("Product 2: {}", url(2))));

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_stop_by_index_renumbers() {
    let mut f = fixture(false).await;
    for n in 1..=3 {
        f.handler.execute(start(n)).await;
    }

    let outcome = f.handler.stop_monitor("restocks", Some(1)).await.unwrap();
    assert!(matches!(outcome, StopOutcome::Stopped(ref s) if s.url == url(1)));

    let listing = f.handler.registry().list("restocks");
    assert_eq!(listing[0].index, 1);
    assert_eq!(listing[0].url, url(2));
    assert_eq!(listing[1].index, 2);
    assert_eq!(listing[1].url, url(3));

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_stop_invalid_index() {
    let mut f = fixture(false).await;
    f.handler.execute(start(1)).await;

    let err = f.handler.stop_monitor("restocks", Some(5)).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Registry(RegistryError::InvalidIndex { index: 5, len: 1 })
    ));
    let reply = f
        .handler
        .execute(Command::Stop {
            destination: "restocks".into(),
            index: Some(0),
        })
        .await;
    assert_eq!(reply, "Invalid product number 0: expected 1 to 1");
    assert_eq!(f.handler.registry().len(), 1);

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_stop_with_nothing_monitored() {
    let mut f = fixture(false).await;
    let reply = f
        .handler
        .execute(Command::Stop {
            destination: "restocks".into(),
            index: Some(1),
        })
        .await;
    assert_eq!(reply, reply::NOTHING_MONITORED);

    // Also after the last monitor is gone
    f.handler.execute(start(1)).await;
    f.handler.stop_monitor("restocks", Some(1)).await.unwrap();
    let outcome = f.handler.stop_monitor("restocks", Some(1)).await.unwrap();
    assert!(matches!(outcome, StopOutcome::Listing(ref entries) if entries.is_empty()));
}

#[tokio::test]
async fn test_status_reply() {
    let mut f = fixture(false).await;
    let empty = f
        .handler
        .execute(Command::Status {
            destination: "restocks".into(),
        })
        .await;
    assert_eq!(empty, reply::NOTHING_MONITORED);

    f.handler.execute(start(1)).await;
    let reply = f
        .handler
        .execute(Command::Status {
            destination: "restocks".into(),
        })
        .await;
    assert!(reply.contains("1. SATIN MIDI DRESS (39,95 EUR)"));
    assert!(reply.contains("Status: Out of Stock"));

    f.handler.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_gracefully_stops_everything() {
    let mut f = fixture(false).await;
    f.handler.execute(start(1)).await;
    f.handler.execute(start(2)).await;

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_ctrl_c(cancel.clone());
    let stopped = shutdown_gracefully(f.handler, cancel.clone(), Some(signal_task)).await;

    assert_eq!(stopped, 2);
    assert!(cancel.is_cancelled());
}
