// src/services/html_listing.rs

//! Listing page scraper.
//!
//! Used when a store has no platform feed. Candidate listing paths are
//! probed in order; on each page JSON-LD `Product` data is preferred, and
//! only when there is none are product-looking links collected instead.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use super::{Extractor, parse_selector};
use crate::error::Result;
use crate::models::{ListingConfig, Product, SourceTag, Variant};
use crate::utils::http::PageFetcher;
use crate::utils::price::parse_price_value;
use crate::utils::text::{normalize_whitespace, strip_html};
use crate::utils::{canonical_url, join_path, resolve_url};

/// Path fragments that mark a link as pointing at a product.
const PRODUCT_PATH_HINTS: [&str; 5] = ["/products/", "/product/", "/product-", "/item", "/p/"];

/// How many ancestors are checked for a product-like class.
const ANCESTOR_DEPTH: usize = 3;

const MAX_TITLE_CHARS: usize = 200;

/// Scrapes products from the store's listing pages.
pub struct HtmlListingExtractor {
    fetcher: Arc<dyn PageFetcher>,
    paths: Vec<String>,
}

impl HtmlListingExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ListingConfig) -> Self {
        Self {
            fetcher,
            paths: config.paths.clone(),
        }
    }
}

#[async_trait]
impl Extractor for HtmlListingExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn try_extract(&self, store_url: &str) -> Result<Vec<Product>> {
        for path in &self.paths {
            let page_url = join_path(store_url, path);
            let body = match self.fetcher.fetch_text(&page_url).await {
                Ok(body) => body,
                Err(error) => {
                    log::debug!("Listing probe {} failed: {}", page_url, error);
                    continue;
                }
            };

            match parse_listing(&body, &page_url) {
                Ok(products) if !products.is_empty() => {
                    log::info!("Found {} products on {}", products.len(), page_url);
                    return Ok(products);
                }
                Ok(_) => log::debug!("No products on {}", page_url),
                Err(error) => log::warn!("Failed to parse listing {}: {}", page_url, error),
            }
        }

        Ok(Vec::new())
    }
}

/// Extract products from one listing page.
pub fn parse_listing(html: &str, page_url: &str) -> Result<Vec<Product>> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let products = json_ld_products(&document, &base)?;
    if !products.is_empty() {
        return Ok(products);
    }

    anchor_products(&document, &base)
}

fn json_ld_products(document: &Html, base: &Url) -> Result<Vec<Product>> {
    let script_sel = parse_selector(r#"script[type="application/ld+json"]"#)?;
    let mut products = Vec::new();

    for script in document.select(&script_sel) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_ld_products(&value, base, &mut products),
            Err(error) => log::debug!("Skipping unparsable JSON-LD block: {}", error),
        }
    }

    Ok(products)
}

fn collect_ld_products(value: &Value, base: &Url, out: &mut Vec<Product>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_ld_products(item, base, out);
            }
        }
        Value::Object(map) => {
            if has_ld_type(value, "Product") {
                if let Some(product) = ld_product(value, base) {
                    out.push(product);
                }
                return;
            }
            if let Some(graph) = map.get("@graph") {
                collect_ld_products(graph, base, out);
            }
            if has_ld_type(value, "ItemList") {
                if let Some(Value::Array(elements)) = map.get("itemListElement") {
                    for element in elements {
                        collect_ld_products(element.get("item").unwrap_or(element), base, out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn has_ld_type(value: &Value, wanted: &str) -> bool {
    let matches = |t: &str| t == wanted || t.ends_with(&format!("/{wanted}"));
    match value.get("@type") {
        Some(Value::String(t)) => matches(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn ld_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn ld_image(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.iter().find_map(ld_image),
        Value::Object(_) => ld_str(value, "url").or_else(|| ld_str(value, "contentUrl")),
        _ => None,
    }
}

fn ld_offer_price(offer: &Value) -> Option<rust_decimal::Decimal> {
    offer
        .get("price")
        .and_then(parse_price_value)
        .or_else(|| offer.get("lowPrice").and_then(parse_price_value))
}

fn ld_product(value: &Value, base: &Url) -> Option<Product> {
    let title = normalize_whitespace(ld_str(value, "name")?);

    let url = ld_str(value, "url")
        .map(|href| resolve_url(base, href))
        .unwrap_or_else(|| base.to_string());

    let offers: Vec<&Value> = match value.get("offers") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(offer @ Value::Object(_)) => vec![offer],
        _ => Vec::new(),
    };

    let mut product =
        Product::new(title, url, SourceTag::Html).with_price(offers.iter().find_map(|o| ld_offer_price(o)));

    if let Some(currency) = offers.iter().find_map(|o| ld_str(o, "priceCurrency")) {
        product.currency = currency.to_uppercase();
    }
    product.description = ld_str(value, "description").map(strip_html).unwrap_or_default();
    product.image_url = value
        .get("image")
        .and_then(ld_image)
        .map(|src| resolve_url(base, src));

    if offers.len() > 1 {
        product.variants = offers
            .iter()
            .map(|offer| Variant {
                title: ld_str(offer, "name").unwrap_or_default().to_string(),
                price: ld_offer_price(offer),
                sku: ld_str(offer, "sku").unwrap_or_default().to_string(),
            })
            .collect();
    }

    Some(product)
}

/// Same-host anchors that look like product links.
fn anchor_products(document: &Html, base: &Url) -> Result<Vec<Product>> {
    let anchor_sel = parse_selector("a[href]")?;
    let img_sel = parse_selector("img[alt]")?;
    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(link) = base.join(href) else {
            continue;
        };
        if link.host_str() != base.host_str() || !looks_like_product(&anchor, &link) {
            continue;
        }

        let Some(title) = anchor_title(&anchor, &img_sel) else {
            continue;
        };

        let url = link.to_string();
        if seen.insert(canonical_url(&url)) {
            products.push(Product::new(title, url, SourceTag::Html));
        }
    }

    Ok(products)
}

/// Product-like path, or a "product" class on the anchor or a close ancestor.
///
/// Ancestor classes stand in for the text surrounding the link.
fn looks_like_product(anchor: &ElementRef, link: &Url) -> bool {
    let path = link.path().to_lowercase();
    if path.trim_end_matches('/').ends_with("/products") {
        return false;
    }
    if PRODUCT_PATH_HINTS.iter().any(|hint| path.contains(hint)) {
        return true;
    }

    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(ANCESTOR_DEPTH)
        .chain(std::iter::once(*anchor))
        .filter_map(|el| el.value().attr("class"))
        .any(|class| class.to_lowercase().contains("product"))
}

fn anchor_title(anchor: &ElementRef, img_sel: &Selector) -> Option<String> {
    let text = normalize_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
    let title = if text.is_empty() {
        anchor
            .value()
            .attr("title")
            .map(normalize_whitespace)
            .or_else(|| {
                anchor
                    .select(img_sel)
                    .next()
                    .and_then(|img| img.value().attr("alt"))
                    .map(normalize_whitespace)
            })?
    } else {
        text
    };

    let chars = title.chars().count();
    if chars < 2 || chars > MAX_TITLE_CHARS {
        return None;
    }
    Some(title)
}
