//! Notification rendering.

use crate::config::{STATUS_IN_STOCK, STATUS_OUT_OF_STOCK};
use crate::notify::{Notification, NotifyTarget};
use crate::stock::{qualifying_sizes, SizeMapping, StockSnapshot};

/// How a monitored product is presented to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    pub name: String,
    pub price: Option<String>,
    pub image_link: Option<String>,
}

/// Where and to whom a watch task delivers its notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: String,
    pub notify_target: NotifyTarget,
    pub display: DisplayInfo,
}

pub fn status_label(in_stock: bool) -> &'static str {
    if in_stock {
        STATUS_IN_STOCK
    } else {
        STATUS_OUT_OF_STOCK
    }
}

/// Builds the notification for the current stock of a product.
pub fn render_notification(
    delivery: &Delivery,
    url: &str,
    snapshot: &StockSnapshot,
    sizes: &SizeMapping,
) -> Notification {
    Notification {
        title: delivery.display.name.clone(),
        url: url.to_string(),
        price: delivery.display.price.clone(),
        status: status_label(snapshot.has_qualifying_stock()).to_string(),
        sizes: qualifying_sizes(snapshot, sizes),
        image: delivery.display.image_link.clone(),
        mention: delivery.notify_target.clone(),
    }
}
