// src/services/fetcher.rs

//! Store crawling through an ordered strategy chain.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::{Extractor, HtmlListingExtractor, PlatformJsonExtractor, ProductPageExtractor};
use crate::error::Result;
use crate::models::{Config, Product, Snapshot};
use crate::utils::http::{PageFetcher, create_async_client};

/// Result of crawling one store.
#[derive(Debug, Clone)]
pub struct StoreCrawl {
    /// Name of the strategy that produced data, if any did
    pub strategy: Option<&'static str>,
    /// Products found, possibly none
    pub snapshot: Snapshot,
}

impl StoreCrawl {
    pub fn store_url(&self) -> &str {
        &self.snapshot.store_url
    }
}

/// Crawls stores by trying each extraction strategy until one yields data.
pub struct StoreFetcher {
    strategies: Vec<Box<dyn Extractor>>,
    product_page: ProductPageExtractor,
    max_concurrent: usize,
}

impl StoreFetcher {
    /// Create a fetcher backed by a real HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Ok(Self::with_fetcher(config, Arc::new(client)))
    }

    /// Create a fetcher that reads pages through the given source.
    ///
    /// The chain is the platform feed, then the HTML listing scraper.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        let strategies: Vec<Box<dyn Extractor>> = vec![
            Box::new(PlatformJsonExtractor::new(
                Arc::clone(&fetcher),
                &config.platform,
            )),
            Box::new(HtmlListingExtractor::new(
                Arc::clone(&fetcher),
                &config.listing,
            )),
        ];

        Self {
            strategies,
            product_page: ProductPageExtractor::new(fetcher),
            max_concurrent: config.crawler.max_concurrent.max(1),
        }
    }

    /// Append a strategy to the end of the chain.
    pub fn with_strategy(mut self, strategy: Box<dyn Extractor>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the strategies, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Crawl a store and return its products, or an empty list.
    pub async fn crawl_store(&self, store_url: &str) -> Vec<Product> {
        self.crawl(store_url).await.snapshot.products
    }

    /// Crawl a store, recording which strategy produced the result.
    pub async fn crawl(&self, store_url: &str) -> StoreCrawl {
        for strategy in &self.strategies {
            let products = strategy.extract(store_url).await;
            if !products.is_empty() {
                log::info!(
                    "{}: {} products via {}",
                    store_url,
                    products.len(),
                    strategy.name()
                );
                return StoreCrawl {
                    strategy: Some(strategy.name()),
                    snapshot: Snapshot::new(store_url, products),
                };
            }
            log::debug!("{}: {} yielded nothing", store_url, strategy.name());
        }

        log::warn!("{}: no strategy yielded products", store_url);
        StoreCrawl {
            strategy: None,
            snapshot: Snapshot::new(store_url, Vec::new()),
        }
    }

    /// Crawl several stores concurrently.
    ///
    /// Results arrive in completion order, not input order.
    pub async fn crawl_stores(&self, store_urls: &[String]) -> Vec<StoreCrawl> {
        stream::iter(store_urls)
            .map(|url| self.crawl(url))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await
    }

    /// Extract a single product from a direct product URL.
    pub async fn extract_product_page(&self, url: &str) -> Option<Product> {
        match self.product_page.extract_one(url).await {
            Ok(product) => product,
            Err(error) => {
                log::warn!("Product page extraction failed for {}: {}", url, error);
                None
            }
        }
    }
}
