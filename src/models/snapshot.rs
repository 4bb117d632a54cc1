//! Catalog snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// All products observed on one store at one point in time.
///
/// Product order carries no meaning. It is preserved only so diffs are
/// reproducible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Base URL of the store that was crawled
    pub store_url: String,

    /// When the crawl finished
    pub captured_at: DateTime<Utc>,

    /// Observed products
    pub products: Vec<Product>,
}

impl Snapshot {
    /// Create a snapshot captured now.
    pub fn new(store_url: impl Into<String>, products: Vec<Product>) -> Self {
        Self::captured_at(store_url, products, Utc::now())
    }

    pub fn captured_at(
        store_url: impl Into<String>,
        products: Vec<Product>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            store_url: store_url.into(),
            captured_at,
            products,
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;

    #[test]
    fn test_snapshot_json_roundtrip_keeps_order() {
        let snapshot = Snapshot::new(
            "https://shop.example",
            vec![
                Product::new("B", "https://shop.example/b", SourceTag::Html),
                Product::new("A", "https://shop.example/a", SourceTag::Html),
            ],
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        let loaded: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.products[0].title, "B");
        assert_eq!(loaded.captured_at, snapshot.captured_at);
    }
}
