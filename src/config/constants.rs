//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including poll timing, upstream defaults, and retry parameters.

use std::time::Duration;

/// Default base URL of the storefront catalog API.
///
/// Availability and recommendation paths are appended to this base, e.g.
/// `{base}/store/{market_id}/product/id/{product_id}/availability`.
pub const DEFAULT_API_BASE: &str = "https://www.zara.com/itxrest/1/catalog";

/// Default settings file (market id and notification destinations)
pub const DEFAULT_SETTINGS_PATH: &str = "config.json";
/// Default file the monitor registry is persisted to
pub const DEFAULT_STATE_PATH: &str = "monitors.json";

/// Query parameter that carries the product id in storefront product URLs
pub const PRODUCT_ID_QUERY_PARAM: &str = "v1";

// Poll timing
/// Delay between two stock checks of the same product
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Pause after a notification before polling resumes.
/// Twenty poll intervals, which caps notifications to one per cool-down window.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(20);
/// Per-request HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for upstream requests.
///
/// The inventory API rejects obvious non-browser clients, so this mimics a
/// desktop Chrome. Users can override it via `--user-agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

// Availability labels reported by the inventory endpoint
pub const AVAILABILITY_IN_STOCK: &str = "in_stock";
pub const AVAILABILITY_LOW_ON_STOCK: &str = "low_on_stock";
pub const AVAILABILITY_OUT_OF_STOCK: &str = "out_of_stock";

// Notification text
/// Shown in place of the size list when no qualifying SKU resolves to a size
pub const SIZES_UNAVAILABLE_PLACEHOLDER: &str = "Sizing Info Unavailable";
pub const STATUS_IN_STOCK: &str = "In Stock";
pub const STATUS_OUT_OF_STOCK: &str = "Out of Stock";
/// Embed colour for in-stock notifications (green)
pub const NOTIFICATION_COLOR: u32 = 0x2ECC71;

// Retry strategy (size mapping and product metadata fetches)
/// Delay in milliseconds before the first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Each retry waits this many times longer than the previous one
pub const RETRY_GROWTH: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
