//! Product data structures.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::canonical_url;

/// Currency assumed when a source does not state one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Which extraction strategy produced a product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// Platform product feed (`/products.json`)
    PlatformJson,
    /// Listing page scrape (JSON-LD or anchor heuristics)
    Html,
    /// Single product page (Open Graph / price heuristics)
    HtmlDetail,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::PlatformJson => "platform-json",
            SourceTag::Html => "html",
            SourceTag::HtmlDetail => "html-detail",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub title: String,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sku: String,
}

/// A product as observed on a competitor store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Product title
    pub title: String,

    /// Current price, when the source exposes one that parses
    pub price: Option<Decimal>,

    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Plain-text description
    #[serde(default)]
    pub description: String,

    /// Canonical product link
    pub url: String,

    /// Primary image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Variants in source order
    #[serde(default)]
    pub variants: Vec<Variant>,

    /// Strategy that produced the record
    pub source: SourceTag,

    /// Platform id, when the source provides one
    #[serde(default)]
    pub external_id: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Product {
    /// Create a product with only a title and link set.
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: SourceTag) -> Self {
        Self {
            title: title.into(),
            price: None,
            currency: default_currency(),
            description: String::new(),
            url: url.into(),
            image_url: None,
            variants: Vec::new(),
            source,
            external_id: None,
        }
    }

    pub fn with_price(mut self, price: Option<Decimal>) -> Self {
        self.price = price;
        self
    }

    /// Stable key for matching this product across scans.
    pub fn identity(&self) -> IdentityKey {
        match self.external_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => IdentityKey::Platform(id.to_string()),
            _ => IdentityKey::Listing {
                title: self.title.trim().to_string(),
                url: canonical_url(&self.url),
            },
        }
    }
}

/// Identity of a product across snapshots.
///
/// Never derived from storage row ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKey {
    Platform(String),
    Listing { title: String, url: String },
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Platform(id) => write!(f, "platform:{id}"),
            IdentityKey::Listing { title, url } => write!(f, "{title}|{url}"),
        }
    }
}
