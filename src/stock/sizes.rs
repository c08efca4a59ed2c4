//! SKU to display-size resolution.

use std::collections::BTreeMap;

use super::snapshot::StockSnapshot;

/// SKU to human-readable size (e.g. `"431706812-800-2" -> "M"`).
pub type SizeMapping = BTreeMap<String, String>;

/// Lazily populated size mapping of one monitor.
///
/// `Resolved` with an empty mapping means the product was found but lists no
/// sizes, which is final. `Failed` means the lookup could not complete and is
/// attempted again the next time sizes are requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SizeCache {
    #[default]
    Unresolved,
    Resolved(SizeMapping),
    Failed,
}

impl SizeCache {
    pub fn mapping(&self) -> Option<&SizeMapping> {
        match self {
            SizeCache::Resolved(mapping) => Some(mapping),
            SizeCache::Unresolved | SizeCache::Failed => None,
        }
    }

    pub fn needs_fetch(&self) -> bool {
        !matches!(self, SizeCache::Resolved(_))
    }
}

/// Display sizes of the qualifying SKUs in `snapshot`.
///
/// SKUs without a known size are left out, so the result can be empty even
/// when the snapshot has stock.
pub fn qualifying_sizes(snapshot: &StockSnapshot, mapping: &SizeMapping) -> Vec<String> {
    snapshot
        .qualifying_skus()
        .filter_map(|sku| mapping.get(sku).cloned())
        .collect()
}
