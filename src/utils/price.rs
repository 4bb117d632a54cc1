// src/utils/price.rs

//! Price string normalization.
//!
//! Storefronts print prices in whatever locale they target, so the same
//! value shows up as `1,299.50`, `1.299,50` or `€1299,50`. The rule used
//! here: the separator appearing last is the decimal point; a lone comma
//! is a decimal point only when exactly two digits follow it.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parse a locale-ambiguous price string into a two-place decimal.
///
/// Returns `None` for empty input or anything that does not reduce to a
/// number. Never panics.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use storewatch::utils::price::parse_price;
///
/// assert_eq!(parse_price("1.299,50"), Some(Decimal::new(129950, 2)));
/// assert_eq!(parse_price("$1,299.50"), Some(Decimal::new(129950, 2)));
/// assert_eq!(parse_price("not a price"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => {
            let parts: Vec<&str> = cleaned.split(',').collect();
            if parts.len() == 2 && parts[1].len() == 2 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, _) => cleaned,
    };

    if !normalized.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    Decimal::from_str(&normalized)
        .ok()
        .map(|value| value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Parse a price given as a JSON value (string or number).
pub fn parse_price_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => parse_price(s),
        serde_json::Value::Number(n) => parse_price(&n.to_string()),
        _ => None,
    }
}

/// Guess the ISO currency code from a price string.
pub fn detect_currency(raw: &str) -> Option<&'static str> {
    const SYMBOLS: [(&str, &str); 9] = [
        ("€", "EUR"),
        ("£", "GBP"),
        ("¥", "JPY"),
        ("₩", "KRW"),
        ("₹", "INR"),
        ("EUR", "EUR"),
        ("GBP", "GBP"),
        ("USD", "USD"),
        ("$", "USD"),
    ];

    let upper = raw.to_uppercase();
    SYMBOLS
        .iter()
        .find(|(symbol, _)| upper.contains(symbol))
        .map(|(_, code)| *code)
}
