//! Single-product stock monitor.
//!
//! A `ProductMonitor` owns one product's identity, its HTTP session and the
//! last two successful stock snapshots. It knows how to poll the inventory
//! endpoint and whether the last poll changed anything; deciding when to
//! notify is the watch task's job.

mod payload;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use reqwest::StatusCode;
use tokio_retry::RetryIf;

use crate::config::api_headers;
use crate::error_handling::{
    categorize_fetch_error, get_retry_strategy, is_retriable, FetchError, PollOutcome, PollStats,
};
use crate::initialization::{init_client, ClientOptions};
use crate::stock::{changed, ProductIdentity, SizeCache, SizeMapping, StockSnapshot};

pub use payload::{parse_availability, parse_size_mapping};

/// Upstream URL layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: String,
}

impl Endpoints {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { api_base }
    }

    /// `{base}/store/{market_id}/product/id/{product_id}/availability`
    pub fn availability_url(&self, identity: &ProductIdentity) -> String {
        format!("{}/availability", self.product_base(identity))
    }

    /// `{base}/store/{market_id}/product/id/{product_id}/recommendations`
    pub fn recommendations_url(&self, identity: &ProductIdentity) -> String {
        format!("{}/recommendations", self.product_base(identity))
    }

    fn product_base(&self, identity: &ProductIdentity) -> String {
        format!(
            "{}/store/{}/product/id/{}",
            self.api_base,
            identity.market_id(),
            identity.product_id()
        )
    }
}

#[derive(Debug, Default)]
struct SnapshotPair {
    previous: Arc<StockSnapshot>,
    current: Arc<StockSnapshot>,
}

/// Monitors the stock of one product.
///
/// Shared between the registry (which closes it) and one watch task (which
/// polls it). Polls must not overlap; the watch task guarantees that by
/// awaiting each `check_stock` before issuing the next.
pub struct ProductMonitor {
    identity: ProductIdentity,
    product_name: String,
    endpoints: Endpoints,
    client_options: ClientOptions,
    // Async lock: only one task may create the session
    session: tokio::sync::Mutex<Option<reqwest::Client>>,
    snapshots: Mutex<SnapshotPair>,
    // Held only to read or publish; never across I/O
    sizes: Mutex<SizeCache>,
    // Async lock: concurrent callers wait for one fetch instead of racing
    size_fetch: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    stats: PollStats,
}

impl ProductMonitor {
    pub fn new(
        identity: ProductIdentity,
        product_name: impl Into<String>,
        endpoints: Endpoints,
        client_options: ClientOptions,
    ) -> Self {
        Self {
            identity,
            product_name: product_name.into(),
            endpoints,
            client_options,
            session: tokio::sync::Mutex::new(None),
            snapshots: Mutex::new(SnapshotPair::default()),
            sizes: Mutex::new(SizeCache::Unresolved),
            size_fetch: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
            stats: PollStats::new(),
        }
    }

    pub fn identity(&self) -> &ProductIdentity {
        &self.identity
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// One-time setup: opens the session and prefetches the size mapping.
    pub async fn initialize(&self) {
        let sizes = self.get_sku_size_mapping().await;
        debug!(
            "Initialized monitor for {} ({} sizes known)",
            self.identity.url(),
            sizes.len()
        );
    }

    /// Polls the inventory endpoint once.
    ///
    /// On success the current snapshot becomes the previous one and the new
    /// data becomes current. Any failure (network, timeout, non-200 status,
    /// malformed payload) is logged and leaves both snapshots untouched, so
    /// the next successful poll is compared against the last successful one.
    ///
    /// # Returns
    ///
    /// `true` if the new snapshot has at least one SKU in stock or low on
    /// stock; `false` otherwise, including on every failure.
    pub async fn check_stock(&self) -> bool {
        let result = self.fetch_snapshot().await;

        // A response that lands after close() must not touch the snapshots
        if self.is_closed() {
            self.stats.record(PollOutcome::Discarded);
            debug!("Discarding stock response for closed monitor {}", self.identity.url());
            return false;
        }

        match result {
            Ok(snapshot) => {
                let in_stock = snapshot.has_qualifying_stock();
                debug!(
                    "Stock for {}: {} SKUs, in stock: {}",
                    self.identity.url(),
                    snapshot.len(),
                    in_stock
                );
                let mut pair = self
                    .snapshots
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                pair.previous = std::mem::replace(&mut pair.current, Arc::new(snapshot));
                self.stats.record(PollOutcome::Success);
                in_stock
            }
            Err(e) => {
                let outcome = categorize_fetch_error(&e);
                self.stats.record(outcome);
                warn!("Stock check for {} failed ({}): {}", self.identity.url(), outcome, e);
                false
            }
        }
    }

    /// Whether the last successful poll changed the stock.
    ///
    /// Pure: compares the held snapshots and may be called any number of
    /// times between polls.
    pub fn has_stock_changed(&self) -> bool {
        let pair = self
            .snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        changed(&pair.previous, &pair.current)
    }

    /// The snapshot of the last successful poll (empty before the first).
    pub fn current_snapshot(&self) -> Arc<StockSnapshot> {
        let pair = self
            .snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&pair.current)
    }

    /// Returns the SKU to size mapping, fetching it on first use.
    ///
    /// Never fails: if the lookup fails the result is empty and the lookup
    /// is attempted again on the next call. Once resolved, the mapping is
    /// kept for the monitor's lifetime.
    pub async fn get_sku_size_mapping(&self) -> SizeMapping {
        if let Some(mapping) = self.size_cache().mapping() {
            return mapping.clone();
        }

        let _fetching = self.size_fetch.lock().await;
        // Another caller may have resolved it while we waited
        let cache = self.size_cache();
        if !cache.needs_fetch() {
            return cache.mapping().cloned().unwrap_or_default();
        }

        let fetched = match self.fetch_size_mapping().await {
            Ok(Some(mapping)) => SizeCache::Resolved(mapping),
            Ok(None) => {
                info!(
                    "Product '{}' not found in recommendations for {}",
                    self.product_name,
                    self.identity.url()
                );
                SizeCache::Failed
            }
            Err(e) => {
                warn!("Size lookup for {} failed: {}", self.identity.url(), e);
                SizeCache::Failed
            }
        };
        let mapping = fetched.mapping().cloned().unwrap_or_default();
        *self.sizes.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = fetched;
        mapping
    }

    /// Current state of the size cache. Does not wait for a lookup in flight.
    pub fn size_cache(&self) -> SizeCache {
        self.sizes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Releases the HTTP session. Idempotent.
    ///
    /// After closing, polls are no longer issued and responses still in
    /// flight are discarded.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.session.lock().await.take().is_some() {
            debug!("Closed session for {}", self.identity.url());
        }
    }

    async fn session(&self) -> Result<reqwest::Client, FetchError> {
        let mut session = self.session.lock().await;
        if self.is_closed() {
            return Err(FetchError::Closed);
        }
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }
        let client = init_client(&self.client_options).map_err(|source| FetchError::Transport {
            url: self.identity.url().to_string(),
            source,
        })?;
        *session = Some(client.clone());
        Ok(client)
    }

    async fn fetch_snapshot(&self) -> Result<StockSnapshot, FetchError> {
        let url = self.endpoints.availability_url(&self.identity);
        let body = self.fetch_text(&url).await?;
        parse_availability(&body).map_err(|reason| FetchError::Malformed { url, reason })
    }

    async fn fetch_size_mapping(&self) -> Result<Option<SizeMapping>, FetchError> {
        let url = self.endpoints.recommendations_url(&self.identity);
        let body = RetryIf::spawn(get_retry_strategy(), || self.fetch_text(&url), is_retriable).await?;
        parse_size_mapping(&body, &self.product_name)
            .map_err(|reason| FetchError::Malformed { url, reason })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let client = self.session().await?;
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = client
            .get(url)
            .headers(api_headers(self.identity.url()))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

impl std::fmt::Debug for ProductMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductMonitor")
            .field("url", &self.identity.url())
            .field("product_name", &self.product_name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ProductIdentity {
        ProductIdentity::parse("https://shop.example/pt/pt/dress-p1.html?v1=431706812", "10701")
            .unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let endpoints = Endpoints::new("https://api.example/itxrest/1/catalog/");
        assert_eq!(
            endpoints.availability_url(&identity()),
            "https://api.example/itxrest/1/catalog/store/10701/product/id/431706812/availability"
        );
        assert_eq!(
            endpoints.recommendations_url(&identity()),
            "https://api.example/itxrest/1/catalog/store/10701/product/id/431706812/recommendations"
        );
    }

    #[test]
    fn test_new_monitor_has_no_data() {
        let monitor = ProductMonitor::new(
            identity(),
            "DRESS",
            Endpoints::new("http://127.0.0.1:9"),
            ClientOptions::default(),
        );
        assert!(monitor.current_snapshot().is_empty());
        // Nothing observed yet counts as changed; the watch task also needs stock to notify
        assert!(monitor.has_stock_changed());
        assert!(!monitor.is_closed());
    }

    #[tokio::test]
    async fn test_closed_monitor_never_polls() {
        let monitor = ProductMonitor::new(
            identity(),
            "DRESS",
            Endpoints::new("http://127.0.0.1:9"),
            ClientOptions::default(),
        );
        monitor.close().await;
        monitor.close().await;
        assert!(monitor.is_closed());
        assert!(!monitor.check_stock().await);
        assert_eq!(monitor.stats().count(PollOutcome::Discarded), 1);
        assert!(matches!(
            monitor.session().await,
            Err(FetchError::Closed)
        ));
    }
}
