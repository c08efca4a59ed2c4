//! HTTP header values sent to the storefront.
//!
//! The inventory API serves JSON only to requests that look like they come
//! from a browser tab on the product page.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};

/// Accept header for JSON API calls
pub const HEADER_ACCEPT_JSON: &str = "application/json, text/plain, */*";
/// Accept header for product page fetches
pub const HEADER_ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
/// Accept-Language header
pub const HEADER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Builds the per-request headers for an upstream JSON call.
///
/// The `Referer` is set to the product page so the API treats the call as
/// coming from that page. An unrepresentable referer is left out.
pub fn api_headers(referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HEADER_ACCEPT_JSON));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(HEADER_ACCEPT_LANGUAGE),
    );
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER, value);
    }
    headers
}
