//! Alert classification.
//!
//! Turns a [`DiffResult`] into severity-ranked alerts. The thresholds are
//! fixed:
//!
//! | alert            | critical | high  | medium | low     |
//! |------------------|----------|-------|--------|---------|
//! | `new_product`    | -        | ≥ 5   | ≥ 2    | 1       |
//! | `out_of_stock`   | ≥ 5      | ≥ 3   | 1-2    | -       |
//! | `price_drop`     | ≥ 20 %   | ≥ 10 % | ≥ 5 % | < 5 %   |
//! | `price_increase` | -        | ≥ 20 % | ≥ 10 % | < 10 % |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::diff::{DiffResult, PriceChange};
use crate::models::{Alert, AlertData, AlertKind, Product, Severity};

/// Sample titles carried by catalog alerts.
pub const MAX_SAMPLE_TITLES: usize = 5;

/// Severity for a batch of newly listed products.
pub fn new_product_severity(count: usize) -> Severity {
    match count {
        5.. => Severity::High,
        2.. => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Severity for a batch of de-listed products.
pub fn out_of_stock_severity(count: usize) -> Severity {
    match count {
        5.. => Severity::Critical,
        3.. => Severity::High,
        _ => Severity::Medium,
    }
}

/// Severity for a price drop of the given magnitude.
pub fn price_drop_severity(change_percent: Decimal) -> Severity {
    let magnitude = change_percent.abs();
    if magnitude >= Decimal::from(20) {
        Severity::Critical
    } else if magnitude >= Decimal::TEN {
        Severity::High
    } else if magnitude >= Decimal::from(5) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Severity for a price increase of the given magnitude.
pub fn price_increase_severity(change_percent: Decimal) -> Severity {
    let magnitude = change_percent.abs();
    if magnitude >= Decimal::from(20) {
        Severity::High
    } else if magnitude >= Decimal::TEN {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Classify a diff, stamping alerts with the current time.
pub fn classify(diff: &DiffResult) -> Vec<Alert> {
    classify_at(diff, Utc::now())
}

/// Classify a diff, stamping alerts with `now`.
///
/// Order: new products, removed products, then one alert per price change
/// in diff order.
pub fn classify_at(diff: &DiffResult, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if !diff.new_products.is_empty() {
        let count = diff.new_products.len();
        alerts.push(Alert {
            kind: AlertKind::NewProduct,
            severity: new_product_severity(count),
            message: format!("{} new {} listed", count, plural(count)),
            data: catalog_data(&diff.new_products),
            created_at: now,
        });
    }

    if !diff.removed_products.is_empty() {
        let count = diff.removed_products.len();
        alerts.push(Alert {
            kind: AlertKind::OutOfStock,
            severity: out_of_stock_severity(count),
            message: format!("{} {} no longer listed", count, plural(count)),
            data: catalog_data(&diff.removed_products),
            created_at: now,
        });
    }

    alerts.extend(
        diff.price_changes
            .iter()
            .filter_map(|change| price_alert(change, now)),
    );

    alerts
}

fn price_alert(change: &PriceChange, now: DateTime<Utc>) -> Option<Alert> {
    let (kind, severity, verb) = if change.change_percent.is_zero() {
        return None;
    } else if change.is_drop() {
        (
            AlertKind::PriceDrop,
            price_drop_severity(change.change_percent),
            "dropped",
        )
    } else {
        (
            AlertKind::PriceIncrease,
            price_increase_severity(change.change_percent),
            "rose",
        )
    };

    Some(Alert {
        kind,
        severity,
        message: format!(
            "Price {} on {}: {} {:.2} → {:.2} ({:+.1}%)",
            verb,
            change.title,
            change.currency,
            change.old_price,
            change.new_price,
            change.change_percent
        ),
        data: AlertData::Price {
            identity: change.identity.clone(),
            title: change.title.clone(),
            url: change.url.clone(),
            currency: change.currency.clone(),
            old_price: change.old_price,
            new_price: change.new_price,
            change_percent: change.change_percent,
        },
        created_at: now,
    })
}

fn catalog_data(products: &[Product]) -> AlertData {
    AlertData::Catalog {
        count: products.len(),
        sample_titles: products
            .iter()
            .take(MAX_SAMPLE_TITLES)
            .map(|p| p.title.clone())
            .collect(),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "product" } else { "products" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdentityKey, SourceTag};
    use crate::pipeline::diff::calculate_diff;

    fn products(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                Product::new(
                    format!("Item {i}"),
                    format!("https://shop.example/products/{i}"),
                    SourceTag::Html,
                )
            })
            .collect()
    }

    fn with_new(n: usize) -> DiffResult {
        DiffResult {
            new_products: products(n),
            ..DiffResult::default()
        }
    }

    fn with_removed(n: usize) -> DiffResult {
        DiffResult {
            removed_products: products(n),
            ..DiffResult::default()
        }
    }

    fn change(old: i64, new: i64) -> PriceChange {
        let (old_price, new_price) = (Decimal::from(old), Decimal::from(new));
        PriceChange {
            identity: IdentityKey::Platform("1".to_string()),
            title: "Kettle".to_string(),
            url: "https://shop.example/products/kettle".to_string(),
            currency: "USD".to_string(),
            old_price,
            new_price,
            change_percent: (new_price - old_price) / old_price * Decimal::ONE_HUNDRED,
        }
    }

    fn with_changes(changes: Vec<PriceChange>) -> DiffResult {
        DiffResult {
            price_changes: changes,
            ..DiffResult::default()
        }
    }

    #[test]
    fn test_empty_diff_has_no_alerts() {
        assert!(classify(&DiffResult::default()).is_empty());
    }

    #[test]
    fn test_new_product_severity_tiers() {
        assert_eq!(classify(&with_new(1))[0].severity, Severity::Low);
        assert_eq!(classify(&with_new(2))[0].severity, Severity::Medium);
        assert_eq!(classify(&with_new(4))[0].severity, Severity::Medium);
        assert_eq!(classify(&with_new(5))[0].severity, Severity::High);
    }

    #[test]
    fn test_out_of_stock_severity_tiers() {
        assert_eq!(classify(&with_removed(1))[0].severity, Severity::Medium);
        assert_eq!(classify(&with_removed(2))[0].severity, Severity::Medium);
        assert_eq!(classify(&with_removed(3))[0].severity, Severity::High);
        assert_eq!(classify(&with_removed(5))[0].severity, Severity::Critical);
    }

    #[test]
    fn test_catalog_alert_payload_caps_samples() {
        let alerts = classify(&with_new(7));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::NewProduct);
        assert_eq!(alerts[0].message, "7 new products listed");
        match &alerts[0].data {
            AlertData::Catalog {
                count,
                sample_titles,
            } => {
                assert_eq!(*count, 7);
                assert_eq!(sample_titles.len(), MAX_SAMPLE_TITLES);
                assert_eq!(sample_titles[0], "Item 0");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_price_drop_severity_tiers() {
        assert_eq!(price_drop_severity(Decimal::from(-25)), Severity::Critical);
        assert_eq!(price_drop_severity(Decimal::from(-20)), Severity::Critical);
        assert_eq!(price_drop_severity(Decimal::from(-10)), Severity::High);
        assert_eq!(price_drop_severity(Decimal::from(-5)), Severity::Medium);
        assert_eq!(price_drop_severity(Decimal::new(-49, 1)), Severity::Low);
    }

    #[test]
    fn test_price_increase_severity_tiers() {
        assert_eq!(price_increase_severity(Decimal::from(20)), Severity::High);
        assert_eq!(price_increase_severity(Decimal::from(10)), Severity::Medium);
        assert_eq!(price_increase_severity(Decimal::new(99, 1)), Severity::Low);
    }

    #[test]
    fn test_one_alert_per_price_change() {
        let alerts = classify(&with_changes(vec![change(100, 75), change(100, 112), change(50, 49)]));
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::PriceDrop, AlertKind::PriceIncrease, AlertKind::PriceDrop]
        );
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[1].severity, Severity::Medium);
        assert_eq!(alerts[2].severity, Severity::Low);
    }

    #[test]
    fn test_price_alert_message_and_payload() {
        let alert = &classify(&with_changes(vec![change(100, 75)]))[0];
        assert_eq!(alert.message, "Price dropped on Kettle: USD 100.00 → 75.00 (-25.0%)");
        match &alert.data {
            AlertData::Price {
                old_price,
                new_price,
                change_percent,
                ..
            } => {
                assert_eq!(*old_price, Decimal::from(100));
                assert_eq!(*new_price, Decimal::from(75));
                assert_eq!(*change_percent, Decimal::from(-25));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_quarter_price_cut_end_to_end() {
        let prev = vec![Product::new("Kettle", "https://shop.example/k", SourceTag::Html)
            .with_price(Some(Decimal::from(80)))];
        let curr = vec![Product::new("Kettle", "https://shop.example/k", SourceTag::Html)
            .with_price(Some(Decimal::from(60)))];

        let alerts = classify(&calculate_diff(&prev, &curr));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::PriceDrop);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_classify_at_uses_given_time() {
        let now = Utc::now();
        let alerts = classify_at(&with_removed(1), now);
        assert_eq!(alerts[0].created_at, now);
        assert_eq!(alerts[0].message, "1 product no longer listed");
    }
}
