//! Alert records produced from catalog diffs.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::IdentityKey;

/// What kind of catalog change an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NewProduct,
    OutOfStock,
    PriceDrop,
    PriceIncrease,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::NewProduct => "new_product",
            AlertKind::OutOfStock => "out_of_stock",
            AlertKind::PriceDrop => "price_drop",
            AlertKind::PriceIncrease => "price_increase",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context needed to render an alert without going back to the snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertData {
    /// Products appearing in or disappearing from the catalog
    Catalog {
        count: usize,
        sample_titles: Vec<String>,
    },
    /// A single product's price move
    Price {
        identity: IdentityKey,
        title: String,
        url: String,
        currency: String,
        old_price: Decimal,
        new_price: Decimal,
        change_percent: Decimal,
    },
}

/// A severity-ranked signal about a competitor's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub data: AlertData,
    pub created_at: DateTime<Utc>,
}
