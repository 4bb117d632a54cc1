//! Single product page extraction.
//!
//! Reads Open Graph / product meta tags first, then falls back to the
//! `<title>` tag and to price-looking markup.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::Html;
use url::Url;

use super::{Extractor, parse_selector};
use crate::error::{AppError, Result};
use crate::models::{DEFAULT_CURRENCY, Product, SourceTag};
use crate::utils::http::PageFetcher;
use crate::utils::price::{detect_currency, parse_price};
use crate::utils::resolve_url;
use crate::utils::text::normalize_whitespace;

/// Currency symbol followed by an amount, e.g. `$ 1,299.00` or `€12,50`.
const SYMBOL_PRICE_PATTERN: &str = r"[$€£¥₩]\s?\d[\d.,]*";

/// First number-looking token in a piece of text.
const AMOUNT_PATTERN: &str = r"\d[\d.,]*\d|\d";

/// Extracts one product from a direct product URL.
pub struct ProductPageExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl ProductPageExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse a product page.
    pub async fn extract_one(&self, url: &str) -> Result<Option<Product>> {
        let body = self.fetcher.fetch_text(url).await?;
        parse_product_page(&body, url)
    }
}

#[async_trait]
impl Extractor for ProductPageExtractor {
    fn name(&self) -> &'static str {
        "html-detail"
    }

    async fn try_extract(&self, url: &str) -> Result<Vec<Product>> {
        Ok(self.extract_one(url).await?.into_iter().collect())
    }
}

/// Parse a product page. Returns `None` when no title can be found.
pub fn parse_product_page(html: &str, page_url: &str) -> Result<Option<Product>> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let title = match meta_content(&document, &["og:title"])? {
        Some(title) => Some(title),
        None => title_tag(&document)?,
    };
    let Some(title) = title else {
        return Ok(None);
    };

    let meta_price = meta_content(&document, &["og:price:amount", "product:price:amount"])?;
    let (price, price_text) = match meta_price.as_deref().and_then(parse_price) {
        Some(price) => (Some(price), meta_price.clone()),
        None => match heuristic_price(&document, html)? {
            Some((price, text)) => (Some(price), Some(text)),
            None => (None, None),
        },
    };

    let currency = meta_content(&document, &["og:price:currency", "product:price:currency"])?
        .map(|c| c.to_uppercase())
        .or_else(|| {
            price_text
                .as_deref()
                .and_then(detect_currency)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let mut product = Product::new(title, page_url, SourceTag::HtmlDetail).with_price(price);
    product.currency = currency;
    product.description = meta_content(&document, &["og:description", "description"])?
        .unwrap_or_default();
    product.image_url = meta_content(&document, &["og:image"])?.map(|src| resolve_url(&base, &src));

    Ok(Some(product))
}

/// First non-empty `content` of a `<meta>` tag matching any of the names.
fn meta_content(document: &Html, names: &[&str]) -> Result<Option<String>> {
    for name in names {
        let selector = parse_selector(&format!(
            r#"meta[property="{name}"], meta[name="{name}"], meta[itemprop="{name}"]"#
        ))?;
        let content = document
            .select(&selector)
            .filter_map(|meta| meta.value().attr("content"))
            .map(normalize_whitespace)
            .find(|content| !content.is_empty());
        if content.is_some() {
            return Ok(content);
        }
    }
    Ok(None)
}

fn title_tag(document: &Html) -> Result<Option<String>> {
    let selector = parse_selector("title")?;
    Ok(document
        .select(&selector)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty()))
}

/// Look for a price in price-styled markup.
///
/// Tried in order: elements with a class containing "price", `data-price`
/// attributes, then currency-symbol-prefixed numbers anywhere in the page.
fn heuristic_price(document: &Html, html: &str) -> Result<Option<(Decimal, String)>> {
    let amount_re = Regex::new(AMOUNT_PATTERN).map_err(|e| AppError::parse("price pattern", e))?;
    let symbol_re =
        Regex::new(SYMBOL_PRICE_PATTERN).map_err(|e| AppError::parse("price pattern", e))?;

    let class_sel = parse_selector(r#"[class*="price"], [class*="Price"]"#)?;
    for element in document.select(&class_sel) {
        let text = normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        let token = symbol_re
            .find(&text)
            .or_else(|| amount_re.find(&text))
            .map(|m| m.as_str().to_string());
        if let Some(price) = token.as_deref().and_then(parse_price) {
            return Ok(Some((price, text)));
        }
    }

    let data_sel = parse_selector("[data-price]")?;
    for element in document.select(&data_sel) {
        if let Some(raw) = element.value().attr("data-price") {
            if let Some(price) = parse_price(raw) {
                return Ok(Some((price, raw.to_string())));
            }
        }
    }

    Ok(symbol_re.find_iter(html).find_map(|m| {
        parse_price(m.as_str()).map(|price| (price, m.as_str().to_string()))
    }))
}
