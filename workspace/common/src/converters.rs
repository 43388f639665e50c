//! Numeric helpers used when turning stored fixed-point amounts into
//! transport values.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Converts a fixed-point amount into the float sent over the wire.
/// Amounts outside the f64 range collapse to zero.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Same as [`decimal_to_f64`] but treats a missing aggregate (e.g. SUM over no rows) as zero.
pub fn opt_decimal_to_f64(value: Option<Decimal>) -> f64 {
    value.map(decimal_to_f64).unwrap_or_default()
}

/// Average of `total` over `count` items, zero when there are no items.
pub fn average(total: f64, count: i64) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// Formats the relative change from `previous` to `current` as a signed percentage
/// with one decimal, e.g. `"+100.0%"` or `"-25.0%"`.
///
/// A zero previous value, or any non-finite input or result, yields `"0.0%"`.
pub fn percent_change(current: f64, previous: f64) -> String {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return "0.0%".to_string();
    }

    let change = (current - previous) / previous * 100.0;
    if !change.is_finite() {
        return "0.0%".to_string();
    }
    // Avoid "-0.0%" when rounding swallows a tiny negative delta
    let rounded = (change * 10.0).round() / 10.0;
    if rounded == 0.0 {
        return "0.0%".to_string();
    }
    format!("{:+.1}%", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_doubling() {
        assert_eq!(percent_change(100.0, 50.0), "+100.0%");
    }

    #[test]
    fn test_percent_change_decrease() {
        assert_eq!(percent_change(75.0, 100.0), "-25.0%");
    }

    #[test]
    fn test_percent_change_zero_previous() {
        assert_eq!(percent_change(100.0, 0.0), "0.0%");
        assert_eq!(percent_change(0.0, 0.0), "0.0%");
    }

    #[test]
    fn test_percent_change_unchanged() {
        assert_eq!(percent_change(42.0, 42.0), "0.0%");
    }

    #[test]
    fn test_percent_change_never_nan() {
        let formatted = percent_change(f64::NAN, 10.0);
        assert_eq!(formatted, "0.0%");
        assert_eq!(percent_change(1e308, 1e-308), "0.0%");
    }

    #[test]
    fn test_average() {
        assert_eq!(average(0.0, 0), 0.0);
        assert_eq!(average(150.0, 3), 50.0);
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(decimal_to_f64(Decimal::new(12345, 2)), 123.45);
        assert_eq!(opt_decimal_to_f64(None), 0.0);
    }
}
