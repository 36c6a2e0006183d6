//! # models::trade
//!
//! Defines [`OpenTrade`] and [`ClosedTrade`], the two record kinds persisted
//! as one text file each.
//!
//! The JSON shape served to the dashboard keeps the short field names the
//! browser client has always used (`tp`, `sl`, `opened_date`, ...).

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::date;

/// Quote currency every ticker is priced in.
pub const QUOTE_SUFFIX: &str = "USD";

// ─── OpenTrade ────────────────────────────────────────────────────────────────

/// An active position.
///
/// `filename` is the identity inside the open collection; it is filled in by
/// the store and never written into the file itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenTrade {
    /// Normalized ticker, e.g. `"BTCUSD"`.
    pub ticker: String,
    pub entry: f64,
    #[serde(rename = "tp")]
    pub take_profit: f64,
    #[serde(rename = "sl")]
    pub stop_loss: f64,
    pub size: f64,
    /// Latest known market price. Persisted as the entry price; only the live
    /// book ever moves it.
    pub current: f64,
    /// UTC date the trade was recorded. Older files do not carry it.
    #[serde(
        serialize_with = "date::serialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub opened_date: Option<NaiveDate>,
    pub filename: String,
}

impl OpenTrade {
    /// Ticker without the quote currency, as shown in tables and filenames.
    pub fn base_ticker(&self) -> &str {
        ticker_base(&self.ticker)
    }
}

// ─── ClosedTrade ──────────────────────────────────────────────────────────────

/// A finalized position. Dates are `None` when the file holds `N/A` or an
/// unparseable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub ticker: String,
    pub entry: f64,
    pub size: f64,
    pub exit: f64,
    #[serde(serialize_with = "date::serialize_opt")]
    pub opened_date: Option<NaiveDate>,
    #[serde(serialize_with = "date::serialize_opt")]
    pub closed_date: Option<NaiveDate>,
    pub filename: String,
}

impl ClosedTrade {
    pub fn base_ticker(&self) -> &str {
        ticker_base(&self.ticker)
    }
}

// ─── Ticker helpers ───────────────────────────────────────────────────────────

/// Uppercases the symbol and appends the quote currency when it is missing.
///
/// `"btc"` → `"BTCUSD"`, `"ethusd"` → `"ETHUSD"`.
pub fn normalize_ticker(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if upper.ends_with(QUOTE_SUFFIX) {
        upper
    } else {
        format!("{upper}{QUOTE_SUFFIX}")
    }
}

/// Strips the trailing quote currency (only the suffix, never an inner match).
pub fn ticker_base(ticker: &str) -> &str {
    ticker.strip_suffix(QUOTE_SUFFIX).unwrap_or(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_suffix() {
        assert_eq!(normalize_ticker("btc"), "BTCUSD");
        assert_eq!(normalize_ticker(" Sol "), "SOLUSD");
    }

    #[test]
    fn test_normalize_keeps_existing_suffix() {
        assert_eq!(normalize_ticker("ethusd"), "ETHUSD");
        assert_eq!(normalize_ticker("XRPUSD"), "XRPUSD");
    }

    #[test]
    fn test_base_only_strips_suffix() {
        assert_eq!(ticker_base("USDCUSD"), "USDC");
        assert_eq!(ticker_base("BTCUSD"), "BTC");
        assert_eq!(ticker_base("BTC"), "BTC");
    }

    #[test]
    fn test_closed_trade_json_shape() {
        let trade = ClosedTrade {
            ticker:      "BTCUSD".into(),
            entry:       100.0,
            size:        1.0,
            exit:        120.0,
            opened_date: NaiveDate::from_ymd_opt(2025, 3, 5),
            closed_date: None,
            filename:    "BTC_20250305101010000_closed.txt".into(),
        };
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["opened_date"], "03/05/25");
        assert_eq!(json["closed_date"], "N/A");
        assert_eq!(json["exit"], 120.0);
    }

    #[test]
    fn test_open_trade_uses_short_level_names() {
        let trade = OpenTrade {
            ticker:      "BTCUSD".into(),
            entry:       100.0,
            take_profit: 130.0,
            stop_loss:   90.0,
            size:        2.0,
            current:     100.0,
            opened_date: None,
            filename:    "BTC_1.txt".into(),
        };
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["tp"], 130.0);
        assert_eq!(json["sl"], 90.0);
        assert!(json.get("opened_date").is_none());
    }
}
