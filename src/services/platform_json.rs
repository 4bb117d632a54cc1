// src/services/platform_json.rs

//! Platform product feed reader.
//!
//! Storefronts on the common hosted platform expose their whole catalog at
//! `/products.json`, paginated with `limit` and `page`. This is the most
//! complete source available, so it is tried before any HTML scraping.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::Extractor;
use crate::error::{AppError, Result};
use crate::models::{PlatformConfig, Product, SourceTag, Variant};
use crate::utils::http::PageFetcher;
use crate::utils::price::parse_price_value;
use crate::utils::text::strip_html;
use crate::utils::{join_path, resolve};

#[derive(Debug, Deserialize)]
struct FeedPage {
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FeedProduct {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    variants: Vec<FeedVariant>,
    #[serde(default)]
    images: Vec<FeedImage>,
}

#[derive(Debug, Deserialize)]
struct FeedVariant {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    sku: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedImage {
    #[serde(default)]
    src: Option<String>,
}

/// Reads the paginated platform product feed.
pub struct PlatformJsonExtractor {
    fetcher: Arc<dyn PageFetcher>,
    page_size: usize,
    max_pages: usize,
}

impl PlatformJsonExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &PlatformConfig) -> Self {
        Self {
            fetcher,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages,
        }
    }

    /// URL of one feed page.
    pub fn page_url(&self, store_url: &str, page: usize) -> Result<String> {
        let mut url = Url::parse(&join_path(store_url, "/products.json"))?;
        url.query_pairs_mut()
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        Ok(url.to_string())
    }

    /// Fetch one page and return its raw items.
    async fn fetch_page(&self, url: &str) -> Result<Vec<Value>> {
        let body = self.fetcher.fetch_text(url).await?;
        let page: FeedPage = serde_json::from_str(&body)
            .map_err(|e| AppError::parse(url, format!("malformed product feed: {e}")))?;
        Ok(page.products)
    }
}

#[async_trait]
impl Extractor for PlatformJsonExtractor {
    fn name(&self) -> &'static str {
        "platform-json"
    }

    async fn try_extract(&self, store_url: &str) -> Result<Vec<Product>> {
        let mut products = Vec::new();

        for page in 1..=self.max_pages {
            let url = self.page_url(store_url, page)?;
            let items = match self.fetch_page(&url).await {
                Ok(items) => items,
                // Nothing usable at all: let the next strategy have a go.
                Err(error) if page == 1 => return Err(error),
                Err(error) => {
                    log::warn!("Stopping feed pagination at page {}: {}", page, error);
                    break;
                }
            };

            if items.is_empty() {
                break;
            }

            let item_count = items.len();
            products.extend(
                items
                    .into_iter()
                    .filter_map(|item| normalize_item(item, store_url)),
            );
            log::debug!(
                "Feed page {} of {}: {} items, {} products so far",
                page,
                store_url,
                item_count,
                products.len()
            );

            if item_count < self.page_size {
                break;
            }
        }

        Ok(products)
    }
}

fn normalize_item(item: Value, store_url: &str) -> Option<Product> {
    let raw: FeedProduct = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(error) => {
            log::debug!("Skipping malformed feed item: {}", error);
            return None;
        }
    };

    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let variants: Vec<Variant> = raw
        .variants
        .iter()
        .map(|v| Variant {
            title: v.title.clone().unwrap_or_default(),
            price: v.price.as_ref().and_then(parse_price_value),
            sku: v.sku.clone().unwrap_or_default(),
        })
        .collect();

    let url = match raw.handle.as_deref().filter(|h| !h.is_empty()) {
        Some(handle) => join_path(store_url, &format!("/products/{handle}")),
        None => store_url.to_string(),
    };

    let image_url = raw
        .images
        .iter()
        .find_map(|image| image.src.as_deref())
        .map(|src| resolve(store_url, src).unwrap_or_else(|| src.to_string()));

    let external_id = raw.id.as_ref().and_then(|id| match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    });

    let mut product = Product::new(title, url, SourceTag::PlatformJson)
        .with_price(variants.first().and_then(|v| v.price));
    product.description = raw.body_html.as_deref().map(strip_html).unwrap_or_default();
    product.image_url = image_url;
    product.variants = variants;
    product.external_id = external_id;
    Some(product)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::utils::http::testing::StaticFetcher;

    const STORE: &str = "https://shop.example";

    fn extractor(fetcher: StaticFetcher, page_size: usize, max_pages: usize) -> PlatformJsonExtractor {
        PlatformJsonExtractor::new(
            Arc::new(fetcher),
            &PlatformConfig {
                page_size,
                max_pages,
            },
        )
    }

    fn feed_url(page: usize, limit: usize) -> String {
        format!("{STORE}/products.json?limit={limit}&page={page}")
    }

    const MUG_PAGE: &str = r#"{"products": [{
        "id": 101,
        "title": "Stoneware Mug",
        "handle": "stoneware-mug",
        "body_html": "<p>Hand-thrown <b>mug</b></p>",
        "images": [{"src": "//cdn.shop.example/mug.jpg"}, {"src": "https://cdn.shop.example/mug-2.jpg"}],
        "variants": [
            {"title": "Blue", "price": "24.00", "sku": "MUG-B"},
            {"title": "Red", "price": "26.00", "sku": "MUG-R"}
        ]
    }]}"#;

    #[test]
    fn test_page_url() {
        let ext = extractor(StaticFetcher::new(), 250, 10);
        assert_eq!(ext.page_url("https://shop.example/", 3).unwrap(), feed_url(3, 250));
    }

    #[tokio::test]
    async fn test_normalizes_feed_item() {
        let fetcher = StaticFetcher::new().page(&feed_url(1, 250), MUG_PAGE);
        let products = extractor(fetcher, 250, 10).extract(STORE).await;

        assert_eq!(products.len(), 1);
        let mug = &products[0];
        assert_eq!(mug.title, "Stoneware Mug");
        assert_eq!(mug.price, Some(Decimal::new(2400, 2)));
        assert_eq!(mug.url, "https://shop.example/products/stoneware-mug");
        assert_eq!(mug.image_url.as_deref(), Some("https://cdn.shop.example/mug.jpg"));
        assert_eq!(mug.description, "Hand-thrown mug");
        assert_eq!(mug.external_id.as_deref(), Some("101"));
        assert_eq!(mug.variants.len(), 2);
        assert_eq!(mug.variants[1].sku, "MUG-R");
        assert_eq!(mug.source, SourceTag::PlatformJson);
    }

    #[tokio::test]
    async fn test_drops_untitled_and_malformed_items() {
        let body = r#"{"products": [
            {"id": 1, "title": "  ", "handle": "blank"},
            {"id": 2, "title": ["not", "a", "string"]},
            {"id": 3, "title": "Kept", "handle": "kept", "variants": [{"price": "oops"}]}
        ]}"#;
        let fetcher = StaticFetcher::new().page(&feed_url(1, 250), body);
        let products = extractor(fetcher, 250, 10).extract(STORE).await;

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Kept");
        assert_eq!(products[0].price, None);
    }

    #[tokio::test]
    async fn test_paginates_until_empty_page() {
        let page = |id: u32| {
            format!(r#"{{"products": [{{"id": {id}, "title": "P{id}", "handle": "p{id}"}}]}}"#)
        };
        let fetcher = StaticFetcher::new()
            .page(&feed_url(1, 1), &page(1))
            .page(&feed_url(2, 1), &page(2))
            .page(&feed_url(3, 1), r#"{"products": []}"#);
        let fetcher = Arc::new(fetcher);
        let ext = PlatformJsonExtractor::new(
            fetcher.clone(),
            &PlatformConfig {
                page_size: 1,
                max_pages: 10,
            },
        );

        let products = ext.extract(STORE).await;
        assert_eq!(products.len(), 2);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_respects_max_pages() {
        let body = r#"{"products": [{"id": 1, "title": "Same", "handle": "same"}]}"#;
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(&feed_url(1, 1), body)
                .page(&feed_url(2, 1), body)
                .page(&feed_url(3, 1), body),
        );
        let ext = PlatformJsonExtractor::new(
            fetcher.clone(),
            &PlatformConfig {
                page_size: 1,
                max_pages: 2,
            },
        );

        assert_eq!(ext.extract(STORE).await.len(), 2);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_keeps_partial_results_on_later_failure() {
        let body = r#"{"products": [{"id": 1, "title": "First", "handle": "first"}]}"#;
        let fetcher = StaticFetcher::new()
            .page(&feed_url(1, 1), body)
            .status(&feed_url(2, 1), 500);

        let products = extractor(fetcher, 1, 10).extract(STORE).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "First");
    }

    #[tokio::test]
    async fn test_first_page_failure_yields_empty() {
        let fetcher = StaticFetcher::new().status(&feed_url(1, 250), 404);
        let ext = extractor(fetcher, 250, 10);
        assert!(ext.try_extract(STORE).await.is_err());
        assert!(ext.extract(STORE).await.is_empty());
    }

    #[tokio::test]
    async fn test_first_page_malformed_yields_empty() {
        let fetcher = StaticFetcher::new().page(&feed_url(1, 250), "<html>not json</html>");
        assert!(extractor(fetcher, 250, 10).extract(STORE).await.is_empty());
    }
}
