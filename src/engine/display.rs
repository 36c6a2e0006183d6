//! # engine::display
//!
//! The single number-formatting policy for everything the dashboard shows.
//!
//! | Kind     | Example                | Rule                                   |
//! |----------|------------------------|----------------------------------------|
//! | currency | `$1234.50`, `-$3.20`   | 2 decimals, sign before the `$`        |
//! | percent  | `10.00%`               | 2 decimals                             |
//! | price    | `0.000012`, `67000`    | up to 9 decimals, trailing zeros cut   |
//! | duration | `3d`                   | whole days                             |
//! | unknown  | `N/A`                  | any value that could not be computed   |

use crate::models::date::UNKNOWN_DATE;

const PRICE_DECIMALS: usize = 9;

/// Rounds to two decimals and folds `-0.00` into `0.00`.
fn two_decimals(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn money(value: f64) -> String {
    let v = two_decimals(value);
    if v < 0.0 {
        format!("-${:.2}", -v)
    } else {
        format!("${v:.2}")
    }
}

pub fn percent(value: f64) -> String {
    format!("{:.2}%", two_decimals(value))
}

pub fn price(value: f64) -> String {
    let text = format!("{:.*}", PRICE_DECIMALS, value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

pub fn days(value: i64) -> String {
    format!("{value}d")
}

pub fn opt_percent(value: Option<f64>) -> String {
    value.map(percent).unwrap_or_else(unknown)
}

pub fn opt_days(value: Option<i64>) -> String {
    value.map(days).unwrap_or_else(unknown)
}

pub fn unknown() -> String {
    UNKNOWN_DATE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money() {
        assert_eq!(money(1234.5), "$1234.50");
        assert_eq!(money(-3.2), "-$3.20");
        assert_eq!(money(0.004), "$0.00");
        assert_eq!(money(-0.004), "$0.00");
        assert_eq!(money(19.519), "$19.52");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(10.0), "10.00%");
        assert_eq!(percent(-4.567), "-4.57%");
        assert_eq!(percent(-0.001), "0.00%");
    }

    #[test]
    fn test_price_trims_trailing_zeros() {
        assert_eq!(price(67000.0), "67000");
        assert_eq!(price(0.5), "0.5");
        assert_eq!(price(0.000012), "0.000012");
        assert_eq!(price(1.23456789012), "1.23456789");
        assert_eq!(price(0.0), "0");
    }

    #[test]
    fn test_unknown_values() {
        assert_eq!(opt_percent(None), "N/A");
        assert_eq!(opt_days(None), "N/A");
        assert_eq!(opt_days(Some(3)), "3d");
    }
}
