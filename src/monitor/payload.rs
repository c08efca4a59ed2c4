//! Upstream payload decoding.
//!
//! Both endpoints are undocumented and loosely typed: SKUs arrive as numbers
//! or strings, and optional sections may be missing entirely.

use serde::Deserialize;
use serde_json::Value;

use crate::stock::{AvailabilityState, SizeMapping, StockSnapshot};

/// A SKU as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkuToken {
    Number(u64),
    Text(String),
}

impl SkuToken {
    fn into_string(self) -> String {
        match self {
            SkuToken::Number(n) => n.to_string(),
            SkuToken::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityPayload {
    // Entries are read one by one so a single odd entry cannot spoil the poll
    #[serde(rename = "skusAvailability", default)]
    skus_availability: Vec<Value>,
}

/// A SKU is a non-empty string or a non-negative integer.
fn sku_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

/// Parses an availability response into a snapshot.
///
/// Entries that cannot be read are skipped one by one: a missing, negative,
/// fractional or empty SKU, or an availability label that is missing, empty
/// or not a string. A body without `skusAvailability` is a valid, empty
/// snapshot.
///
/// # Errors
///
/// Returns a description of the problem if the body is not JSON or
/// `skusAvailability` is not a list.
pub fn parse_availability(body: &str) -> Result<StockSnapshot, String> {
    let payload: AvailabilityPayload = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(payload
        .skus_availability
        .iter()
        .filter_map(|entry| {
            let sku = entry.get("sku").and_then(sku_text)?;
            let label = entry
                .get("availability")
                .and_then(Value::as_str)
                .filter(|label| !label.is_empty())?;
            Some((sku, AvailabilityState::from_label(label)))
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RecommendationsPayload {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
struct Recommendation {
    #[serde(rename = "fullResponse", default)]
    full_response: Option<ProductDetail>,
}

#[derive(Debug, Deserialize)]
struct ProductDetail {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    detail: Option<ColorDetail>,
}

#[derive(Debug, Deserialize)]
struct ColorDetail {
    #[serde(default)]
    colors: Vec<Color>,
}

#[derive(Debug, Deserialize)]
struct Color {
    #[serde(default)]
    sizes: Vec<Size>,
}

#[derive(Debug, Deserialize)]
struct Size {
    sku: SkuToken,
    name: String,
}

/// Extracts the size mapping of `product_name` from a recommendations response.
///
/// The product is matched by exact display-name equality. Returns `Ok(None)`
/// when no recommendation carries that name.
pub fn parse_size_mapping(body: &str, product_name: &str) -> Result<Option<SizeMapping>, String> {
    let payload: RecommendationsPayload =
        serde_json::from_str(body).map_err(|e| e.to_string())?;

    let product = payload
        .recommendations
        .into_iter()
        .filter_map(|r| r.full_response)
        .find(|p| p.name.as_deref() == Some(product_name));

    Ok(product.map(|p| {
        p.detail
            .into_iter()
            .flat_map(|d| d.colors)
            .flat_map(|c| c.sizes)
            .map(|s| (s.sku.into_string(), s.name))
            .collect()
    }))
}
