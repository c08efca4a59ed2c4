//! Product page metadata.
//!
//! Display name and price are read once, when a monitor is registered. The
//! display name also selects the product in the size lookup, so it must match
//! the storefront's own spelling.

use async_trait::async_trait;
use log::debug;
use scraper::{Html, Selector};
use tokio_retry::RetryIf;

use crate::config::{HEADER_ACCEPT_HTML, HEADER_ACCEPT_LANGUAGE};
use crate::error_handling::{get_retry_strategy, MetadataError};

/// CSS selector of the product name heading
const NAME_SELECTOR: &str = "h1.product-detail-info__header-name";
/// CSS selector of the current (possibly discounted) price
const PRICE_SELECTOR: &str = ".money-amount__main";

/// Name and price of a product as shown on its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMetadata {
    pub name: String,
    pub price: Option<String>,
}

/// Looks up product metadata for a URL.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch_product_metadata(&self, url: &str) -> Result<ProductMetadata, MetadataError>;
}

/// Fetches the product page and extracts name and price from its HTML.
pub struct HtmlMetadataFetcher {
    client: reqwest::Client,
}

impl HtmlMetadataFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, MetadataError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, HEADER_ACCEPT_HTML)
            .header(reqwest::header::ACCEPT_LANGUAGE, HEADER_ACCEPT_LANGUAGE)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MetadataError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MetadataFetcher for HtmlMetadataFetcher {
    async fn fetch_product_metadata(&self, url: &str) -> Result<ProductMetadata, MetadataError> {
        // Name and price come from a single page load
        let html = RetryIf::spawn(
            get_retry_strategy(),
            || self.fetch_page(url),
            |e: &MetadataError| matches!(e, MetadataError::Request(_)),
        )
        .await?;
        let metadata = extract_metadata(&html)?;
        debug!("Metadata for {}: {:?}", url, metadata);
        Ok(metadata)
    }
}

/// Extracts name and price from a product page.
///
/// # Errors
///
/// Returns `MetadataError::MissingField("name")` if the page has no
/// non-empty product heading. A missing price is not an error.
pub fn extract_metadata(html: &str) -> Result<ProductMetadata, MetadataError> {
    let document = Html::parse_document(html);
    let name = select_text(&document, NAME_SELECTOR)
        .ok_or(MetadataError::MissingField("name"))?;
    let price = select_text(&document, PRICE_SELECTOR);
    Ok(ProductMetadata { name, price })
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}
