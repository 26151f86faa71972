//! Best-effort price handling for the trip estimate.
//!
//! Collaborators return prices as loose strings ("USD 1,200", "€85/night",
//! "Free"). These helpers are lossy: the result is an estimate, never an
//! authoritative total.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?").expect("price pattern is valid")
});

/// First decimal number in `raw` after removing grouping commas; 0.0 when
/// there is none.
pub fn extract_price(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "");
    NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Two decimals with comma thousands grouping, e.g. `1,650.00`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("USD 1,200", 1200.0)]
    #[case("450", 450.0)]
    #[case("Free", 0.0)]
    #[case("$89.50 per night", 89.5)]
    #[case("from 12,345.67 EUR", 12345.67)]
    #[case("", 0.0)]
    fn test_extract_price(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(extract_price(raw), expected);
    }

    #[rstest]
    #[case(0.0, "0.00")]
    #[case(85.5, "85.50")]
    #[case(1650.0, "1,650.00")]
    #[case(1234567.891, "1,234,567.89")]
    fn test_format_amount(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_amount(amount), expected);
    }
}
