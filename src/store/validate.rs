//! # store::validate
//!
//! Presence and range checks for user-entered trades.
//!
//! Values are checked explicitly instead of by truthiness: a stop-loss or
//! exit of `0` is a real value. Entry and size must be strictly positive, so
//! a zero size is still reported as missing. A ticker names the trade file,
//! so it may only hold ASCII letters and digits.

use crate::models::date::parse_date;
use crate::models::{normalize_ticker, ticker_base, ClosedTrade, ClosedTradeInput, OpenTrade, OpenTradeInput};
use crate::store::StoreError;

/// Collects the names of every field that failed, so one response lists
/// them all.
#[derive(Default)]
struct Checker {
    missing: Vec<&'static str>,
    invalid: Vec<String>,
}

impl Checker {
    fn ticker(&mut self, raw: Option<&str>) -> String {
        let ticker = raw.map(normalize_ticker).unwrap_or_default();
        let base = ticker_base(&ticker);
        if base.is_empty() {
            self.missing.push("ticker");
        } else if !base.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.invalid.push(format!("Invalid ticker {ticker:?}: only letters and digits are allowed"));
        }
        ticker
    }

    fn positive(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => {
                self.missing.push(name);
                0.0
            }
        }
    }

    fn finite(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() => v,
            _ => {
                self.missing.push(name);
                0.0
            }
        }
    }

    fn non_negative(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                self.missing.push(name);
                0.0
            }
        }
    }

    fn date(&mut self, name: &'static str, raw: Option<&str>) -> Option<chrono::NaiveDate> {
        let parsed = raw.and_then(parse_date);
        if parsed.is_none() {
            self.missing.push(name);
        }
        parsed
    }

    fn finish<T>(self, value: T) -> Result<T, StoreError> {
        if !self.missing.is_empty() {
            Err(StoreError::missing(&self.missing))
        } else if !self.invalid.is_empty() {
            Err(StoreError::Validation(self.invalid.join("; ")))
        } else {
            Ok(value)
        }
    }
}

/// Builds the open record to persist. `current` starts at the entry price;
/// `opened_date` and `filename` are the caller's business.
pub fn open_trade(input: &OpenTradeInput) -> Result<OpenTrade, StoreError> {
    let mut check = Checker::default();
    let ticker = check.ticker(input.ticker.as_deref());
    let entry = check.positive("entry", input.entry);
    let take_profit = check.finite("tp", input.take_profit);
    let stop_loss = check.finite("sl", input.stop_loss);
    let size = check.positive("size", input.size);

    check.finish(OpenTrade {
        ticker,
        entry,
        take_profit,
        stop_loss,
        size,
        current: entry,
        opened_date: None,
        filename: String::new(),
    })
}

pub fn closed_trade(input: &ClosedTradeInput) -> Result<ClosedTrade, StoreError> {
    let mut check = Checker::default();
    let ticker = check.ticker(input.ticker.as_deref());
    let entry = check.positive("entry", input.entry);
    let size = check.positive("size", input.size);
    let opened_date = check.date("opened_date", input.opened_date.as_deref());
    let exit = check.non_negative("exit", input.exit);
    let closed_date = check.date("closed_date", input.closed_date.as_deref());

    check.finish(ClosedTrade {
        ticker,
        entry,
        size,
        exit,
        opened_date,
        closed_date,
        filename: String::new(),
    })
}

pub fn exit_price(exit: Option<f64>) -> Result<f64, StoreError> {
    let mut check = Checker::default();
    let exit = check.non_negative("exit", exit);
    check.finish(exit)
}
