//! Catalog diff calculation.
//!
//! Compares two snapshots of the same store and reports which products
//! appeared, which disappeared, and whose price moved. Products are matched
//! by [`IdentityKey`], never by position or storage id.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{IdentityKey, Product, Snapshot};

/// A price move on a product present in both snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub identity: IdentityKey,
    pub title: String,
    pub url: String,
    pub currency: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    /// `(new - old) / old * 100`
    pub change_percent: Decimal,
}

impl PriceChange {
    pub fn is_drop(&self) -> bool {
        self.change_percent.is_sign_negative() && !self.change_percent.is_zero()
    }
}

/// Differences between a previous and a current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// In current, not in previous (current order)
    pub new_products: Vec<Product>,
    /// In previous, not in current (previous order)
    pub removed_products: Vec<Product>,
    /// In both with differing prices (current order)
    pub price_changes: Vec<PriceChange>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.new_products.is_empty()
            || !self.removed_products.is_empty()
            || !self.price_changes.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.new_products.len() + self.removed_products.len() + self.price_changes.len()
    }
}

/// Products keyed by identity, duplicates collapsed.
///
/// A repeated key keeps the slot of its first occurrence but the data of
/// its last.
struct Catalog<'a> {
    order: Vec<IdentityKey>,
    entries: HashMap<IdentityKey, &'a Product>,
}

impl<'a> Catalog<'a> {
    fn build(products: &'a [Product]) -> Self {
        let mut order = Vec::with_capacity(products.len());
        let mut entries = HashMap::with_capacity(products.len());
        for product in products {
            let key = product.identity();
            if entries.insert(key.clone(), product).is_none() {
                order.push(key);
            }
        }
        Self { order, entries }
    }

    fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &'a Product)> + '_ {
        self.order.iter().map(|key| (key, self.entries[key]))
    }

    fn get(&self, key: &IdentityKey) -> Option<&'a Product> {
        self.entries.get(key).copied()
    }
}

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone)]
pub struct CatalogDiff {
    /// Whether to compare prices of products present on both sides
    track_prices: bool,
}

impl Default for CatalogDiff {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogDiff {
    /// Create a diff calculator that reports listings and price moves.
    pub fn new() -> Self {
        Self { track_prices: true }
    }

    /// Create a diff calculator that only reports additions/removals.
    pub fn listings_only() -> Self {
        Self {
            track_prices: false,
        }
    }

    /// Calculate the diff between previous and current product lists.
    pub fn calculate(&self, previous: &[Product], current: &[Product]) -> DiffResult {
        let prev = Catalog::build(previous);
        let curr = Catalog::build(current);

        let mut result = DiffResult::default();

        for (key, product) in curr.iter() {
            match prev.get(key) {
                None => result.new_products.push(product.clone()),
                Some(old) if self.track_prices => {
                    if let Some(change) = price_change(key, old, product) {
                        result.price_changes.push(change);
                    }
                }
                Some(_) => {}
            }
        }

        result.removed_products = prev
            .iter()
            .filter(|(key, _)| curr.get(key).is_none())
            .map(|(_, product)| product.clone())
            .collect();

        result
    }
}

fn price_change(key: &IdentityKey, old: &Product, new: &Product) -> Option<PriceChange> {
    let (old_price, new_price) = (old.price?, new.price?);
    if old_price == new_price {
        return None;
    }
    let change_percent = (new_price - old_price)
        .checked_div(old_price)?
        .checked_mul(Decimal::ONE_HUNDRED)?;

    Some(PriceChange {
        identity: key.clone(),
        title: new.title.clone(),
        url: new.url.clone(),
        currency: new.currency.clone(),
        old_price,
        new_price,
        change_percent,
    })
}

/// Diff two snapshots with price tracking enabled.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> DiffResult {
    CatalogDiff::new().calculate(&previous.products, &current.products)
}

/// Convenience function to calculate diff over product lists.
pub fn calculate_diff(previous: &[Product], current: &[Product]) -> DiffResult {
    CatalogDiff::new().calculate(previous, current)
}
