// src/pipeline/watch.rs

//! Watch pipeline: crawl a competitor, diff against the stored snapshot and
//! classify the changes.

use chrono::Utc;

use super::classify::classify_at;
use super::diff::{DiffResult, diff};
use crate::models::{Alert, Snapshot};
use crate::services::StoreFetcher;

/// How the current crawl related to the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// No previous snapshot; the crawl becomes the baseline
    Baseline { current_count: usize },
    /// Diffed against the previous snapshot
    Compared {
        current_count: usize,
        previous_count: usize,
    },
    /// Nothing crawled while the previous snapshot had products
    Failed { previous_count: usize },
}

impl ScanStatus {
    fn evaluate(current: &Snapshot, previous: Option<&Snapshot>) -> Self {
        match previous {
            None => Self::Baseline {
                current_count: current.len(),
            },
            Some(prev) if current.is_empty() && !prev.is_empty() => Self::Failed {
                previous_count: prev.len(),
            },
            Some(prev) => Self::Compared {
                current_count: current.len(),
                previous_count: prev.len(),
            },
        }
    }

    /// Whether the produced diff reflects real catalog changes.
    pub fn is_compared(&self) -> bool {
        matches!(self, Self::Compared { .. })
    }
}

/// Everything one watch run produces, for the caller to persist and dispatch.
#[derive(Debug, Clone)]
pub struct WatchOutcome {
    pub status: ScanStatus,
    /// Strategy that produced the snapshot, if any
    pub strategy: Option<&'static str>,
    pub snapshot: Snapshot,
    pub diff: DiffResult,
    pub alerts: Vec<Alert>,
}

/// Crawl `store_url`, diff against `previous` and classify the result.
///
/// A first scan yields no alerts. An empty crawl against a non-empty
/// previous snapshot is reported as [`ScanStatus::Failed`] with an empty diff.
pub async fn watch_store(
    fetcher: &StoreFetcher,
    store_url: &str,
    previous: Option<&Snapshot>,
) -> WatchOutcome {
    let crawl = fetcher.crawl(store_url).await;
    let status = ScanStatus::evaluate(&crawl.snapshot, previous);

    let diff = match (status, previous) {
        (ScanStatus::Compared { .. }, Some(prev)) => diff(prev, &crawl.snapshot),
        (ScanStatus::Failed { previous_count }, _) => {
            log::warn!(
                "{}: crawl returned no products (previously {}), skipping diff",
                store_url,
                previous_count
            );
            DiffResult::default()
        }
        _ => {
            log::info!(
                "{}: baseline snapshot with {} products",
                store_url,
                crawl.snapshot.len()
            );
            DiffResult::default()
        }
    };

    let alerts = classify_at(&diff, Utc::now());
    if !alerts.is_empty() {
        log::info!(
            "{}: {} changes, {} alerts",
            store_url,
            diff.change_count(),
            alerts.len()
        );
    }

    WatchOutcome {
        status,
        strategy: crawl.strategy,
        snapshot: crawl.snapshot,
        diff,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{AlertKind, Config, Product, Severity, SourceTag};
    use crate::utils::http::testing::StaticFetcher;

    const STORE: &str = "https://shop.example";
    const FEED: &str = "https://shop.example/products.json?limit=250&page=1";

    fn fetcher(pages: StaticFetcher) -> StoreFetcher {
        StoreFetcher::with_fetcher(&Config::default(), Arc::new(pages))
    }

    fn feed() -> StaticFetcher {
        StaticFetcher::new().page(
            FEED,
            r#"{"products": [
                {"id": 1, "title": "Mug", "handle": "mug", "variants": [{"title": "Default", "price": "15.00"}]},
                {"id": 2, "title": "Bowl", "handle": "bowl", "variants": [{"title": "Default", "price": "22.00"}]}
            ]}"#,
        )
    }

    fn previous() -> Snapshot {
        let mut mug = Product::new("Mug", "https://shop.example/products/mug", SourceTag::PlatformJson)
            .with_price(Some(Decimal::from(20)));
        mug.external_id = Some("1".to_string());
        let mut plate =
            Product::new("Plate", "https://shop.example/products/plate", SourceTag::PlatformJson);
        plate.external_id = Some("3".to_string());
        Snapshot::new(STORE, vec![mug, plate])
    }

    #[tokio::test]
    async fn test_first_scan_is_baseline() {
        let outcome = watch_store(&fetcher(feed()), STORE, None).await;
        assert_eq!(outcome.status, ScanStatus::Baseline { current_count: 2 });
        assert_eq!(outcome.strategy, Some("platform-json"));
        assert_eq!(outcome.snapshot.len(), 2);
        assert!(!outcome.diff.has_changes());
        assert!(outcome.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_changes_against_previous() {
        let prev = previous();
        let outcome = watch_store(&fetcher(feed()), STORE, Some(&prev)).await;

        assert!(outcome.status.is_compared());
        assert_eq!(outcome.diff.new_products[0].title, "Bowl");
        assert_eq!(outcome.diff.removed_products[0].title, "Plate");
        assert_eq!(outcome.diff.price_changes[0].change_percent, Decimal::from(-25));

        let kinds: Vec<AlertKind> = outcome.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::NewProduct, AlertKind::OutOfStock, AlertKind::PriceDrop]
        );
        assert_eq!(outcome.alerts[2].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_html_fallback_feeds_diff_and_alerts() {
        let pages = StaticFetcher::new().status(FEED, 403).page(
            "https://shop.example/collections/all",
            r#"<a href="/products/mug">Mug</a><a href="/products/vase">Vase</a>"#,
        );
        let prev = Snapshot::new(
            STORE,
            vec![Product::new("Mug", "https://shop.example/products/mug/", SourceTag::Html)],
        );

        let outcome = watch_store(&fetcher(pages), STORE, Some(&prev)).await;
        assert_eq!(outcome.strategy, Some("html"));
        assert_eq!(outcome.diff.new_products.len(), 1);
        assert_eq!(outcome.diff.new_products[0].title, "Vase");
        assert!(outcome.diff.removed_products.is_empty());
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].kind, AlertKind::NewProduct);
        assert_eq!(outcome.alerts[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_empty_crawl_is_failed_scan() {
        let prev = previous();
        let outcome = watch_store(&fetcher(StaticFetcher::new()), STORE, Some(&prev)).await;

        assert_eq!(outcome.status, ScanStatus::Failed { previous_count: 2 });
        assert!(outcome.snapshot.is_empty());
        assert!(!outcome.diff.has_changes());
        assert!(outcome.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_empty_against_empty_is_compared() {
        let prev = Snapshot::new(STORE, Vec::new());
        let outcome = watch_store(&fetcher(StaticFetcher::new()), STORE, Some(&prev)).await;
        assert!(outcome.status.is_compared());
        assert!(outcome.alerts.is_empty());
    }
}
