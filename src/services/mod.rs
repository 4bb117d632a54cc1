//! Service layer for the store watcher.
//!
//! This module contains the extraction strategies and the fetcher that
//! chains them:
//! - Platform product feed reading (`PlatformJsonExtractor`)
//! - Listing page scraping (`HtmlListingExtractor`)
//! - Single product page extraction (`ProductPageExtractor`)
//! - Strategy orchestration (`StoreFetcher`)

mod fetcher;
mod html_listing;
mod platform_json;
mod product_page;

use async_trait::async_trait;
use scraper::Selector;

use crate::error::{AppError, Result};
use crate::models::Product;

pub use fetcher::{StoreCrawl, StoreFetcher};
pub use html_listing::{HtmlListingExtractor, parse_listing};
pub use platform_json::PlatformJsonExtractor;
pub use product_page::{ProductPageExtractor, parse_product_page};

/// A way of turning a URL into products.
///
/// Implementations do their work in [`Extractor::try_extract`]; callers go
/// through [`Extractor::extract`], which never fails.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in logs and crawl reports.
    fn name(&self) -> &'static str;

    /// Extract products, reporting network and parse failures.
    async fn try_extract(&self, url: &str) -> Result<Vec<Product>>;

    /// Extract products; any failure yields an empty list.
    async fn extract(&self, url: &str) -> Vec<Product> {
        match self.try_extract(url).await {
            Ok(products) => products,
            Err(error) => {
                log::warn!("{} extraction failed for {}: {}", self.name(), url, error);
                Vec::new()
            }
        }
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
