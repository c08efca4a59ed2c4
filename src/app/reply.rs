//! Reply text for commands.

use crate::registry::{EntrySummary, StatusReport};
use crate::watch::status_label;

pub const NOTHING_MONITORED: &str = "No products are being monitored here";

pub fn started(summary: &EntrySummary) -> String {
    format!("Started monitoring product: {}", summary.url)
}

pub fn stopped(summary: &EntrySummary) -> String {
    format!("Stopped monitoring product: {}", summary.url)
}

/// Numbered listing; the numbers are what `stop` expects.
pub fn listing(destination: &str, entries: &[EntrySummary]) -> String {
    if entries.is_empty() {
        return NOTHING_MONITORED.to_string();
    }
    let mut text = format!("Monitored products in {destination}:");
    for entry in entries {
        text.push_str(&format!("\n  Product {}: {}", entry.index, entry.url));
    }
    text
}

pub fn status(destination: &str, reports: &[StatusReport]) -> String {
    if reports.is_empty() {
        return NOTHING_MONITORED.to_string();
    }
    let mut text = format!("Stock status in {destination}:");
    for report in reports {
        let entry = &report.summary;
        text.push_str(&format!("\n  {}. {}", entry.index, entry.display_name));
        if let Some(price) = &entry.display_price {
            text.push_str(&format!(" ({price})"));
        }
        text.push_str(&format!("\n     {}", entry.url));
        text.push_str(&format!("\n     Status: {}", status_label(entry.in_stock)));
        if !report.sizes.is_empty() {
            text.push_str(&format!("\n     Sizes: {}", report.sizes.join(", ")));
        }
        text.push_str(&format!(
            "\n     Polls: {} ({} failed)",
            entry.polls.total, entry.polls.failed
        ));
    }
    text
}
