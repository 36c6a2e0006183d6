//! # store::codec
//!
//! The on-disk text format of a trade: one `Label: value` pair per line.
//!
//! ```text
//! Ticker: BTCUSD
//! Entry Price: 67000
//! Take Profit: 72000
//! Stop Loss: 64000
//! Position Size: 0.05
//! Current Price: 67000
//! Opened Date: 03/05/25
//! ```
//!
//! Decoding ignores unknown labels and lines without a colon. A record whose
//! required fields are missing or non-numeric decodes to `None`; the store
//! skips it instead of serving half a trade.

use chrono::NaiveDate;

use crate::models::date::{format_date, format_opt_date, parse_date};
use crate::models::{ClosedTrade, OpenTrade};

pub const TICKER: &str = "Ticker";
pub const ENTRY_PRICE: &str = "Entry Price";
pub const TAKE_PROFIT: &str = "Take Profit";
pub const STOP_LOSS: &str = "Stop Loss";
pub const POSITION_SIZE: &str = "Position Size";
pub const CURRENT_PRICE: &str = "Current Price";
pub const OPENED_DATE: &str = "Opened Date";
pub const EXIT_PRICE: &str = "Exit Price";
pub const CLOSED_DATE: &str = "Closed Date";

/// A record kind that lives as one text file in a collection.
pub trait TradeFile: Sized {
    /// Collection label used in logs.
    const KIND: &'static str;

    fn decode(text: &str) -> Option<Self>;
    fn encode(&self) -> String;
    fn set_filename(&mut self, filename: String);
}

// ─── Line helpers ─────────────────────────────────────────────────────────────

/// One encoded line, newline included.
pub fn line(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label}: {value}\n")
}

/// Yields trimmed `(label, value)` pairs; the value keeps any further colons.
fn fields(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|raw| {
        let (label, value) = raw.split_once(':')?;
        Some((label.trim(), value.trim()))
    })
}

/// Whether the text already carries a line with this label.
pub fn has_label(text: &str, label: &str) -> bool {
    fields(text).any(|(found, _)| found == label)
}

fn number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ─── Open trades ──────────────────────────────────────────────────────────────

pub fn decode_open(text_in: &str) -> Option<OpenTrade> {
    let mut ticker = None;
    let mut entry = None;
    let mut take_profit = None;
    let mut stop_loss = None;
    let mut size = None;
    let mut current = None;
    let mut opened_date = None;

    for (label, value) in fields(text_in) {
        match label {
            TICKER => ticker = text(value),
            ENTRY_PRICE => entry = number(value),
            TAKE_PROFIT => take_profit = number(value),
            STOP_LOSS => stop_loss = number(value),
            POSITION_SIZE => size = number(value),
            CURRENT_PRICE => current = number(value),
            OPENED_DATE => opened_date = parse_date(value),
            _ => {}
        }
    }

    let entry = entry?;
    Some(OpenTrade {
        ticker: ticker?,
        entry,
        take_profit: take_profit?,
        stop_loss: stop_loss?,
        size: size?,
        current: current.unwrap_or(entry),
        opened_date,
        filename: String::new(),
    })
}

/// Fixed label order; `Opened Date` only when known.
pub fn encode_open(trade: &OpenTrade) -> String {
    let mut out = String::new();
    out.push_str(&line(TICKER, &trade.ticker));
    out.push_str(&line(ENTRY_PRICE, trade.entry));
    out.push_str(&line(TAKE_PROFIT, trade.take_profit));
    out.push_str(&line(STOP_LOSS, trade.stop_loss));
    out.push_str(&line(POSITION_SIZE, trade.size));
    out.push_str(&line(CURRENT_PRICE, trade.current));
    if let Some(date) = trade.opened_date {
        out.push_str(&line(OPENED_DATE, format_date(date)));
    }
    out
}

impl TradeFile for OpenTrade {
    const KIND: &'static str = "open";

    fn decode(text: &str) -> Option<Self> {
        decode_open(text)
    }

    fn encode(&self) -> String {
        encode_open(self)
    }

    fn set_filename(&mut self, filename: String) {
        self.filename = filename;
    }
}

// ─── Closed trades ────────────────────────────────────────────────────────────

pub fn decode_closed(text_in: &str) -> Option<ClosedTrade> {
    let mut ticker = None;
    let mut entry = None;
    let mut size = None;
    let mut exit = None;
    let mut opened_date: Option<NaiveDate> = None;
    let mut closed_date: Option<NaiveDate> = None;

    for (label, value) in fields(text_in) {
        match label {
            TICKER => ticker = text(value),
            ENTRY_PRICE => entry = number(value),
            POSITION_SIZE => size = number(value),
            OPENED_DATE => opened_date = parse_date(value),
            EXIT_PRICE => exit = number(value),
            CLOSED_DATE => closed_date = parse_date(value),
            _ => {}
        }
    }

    Some(ClosedTrade {
        ticker: ticker?,
        entry: entry?,
        size: size?,
        exit: exit?,
        opened_date,
        closed_date,
        filename: String::new(),
    })
}

pub fn encode_closed(trade: &ClosedTrade) -> String {
    let mut out = String::new();
    out.push_str(&line(TICKER, &trade.ticker));
    out.push_str(&line(ENTRY_PRICE, trade.entry));
    out.push_str(&line(POSITION_SIZE, trade.size));
    out.push_str(&line(OPENED_DATE, format_opt_date(trade.opened_date)));
    out.push_str(&line(EXIT_PRICE, trade.exit));
    out.push_str(&line(CLOSED_DATE, format_opt_date(trade.closed_date)));
    out
}

impl TradeFile for ClosedTrade {
    const KIND: &'static str = "closed";

    fn decode(text: &str) -> Option<Self> {
        decode_closed(text)
    }

    fn encode(&self) -> String {
        encode_closed(self)
    }

    fn set_filename(&mut self, filename: String) {
        self.filename = filename;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_open() -> OpenTrade {
        OpenTrade {
            ticker:      "BTCUSD".into(),
            entry:       67000.5,
            take_profit: 72000.0,
            stop_loss:   0.0,
            size:        0.000123456,
            current:     67010.25,
            opened_date: NaiveDate::from_ymd_opt(2025, 3, 5),
            filename:    String::new(),
        }
    }

    #[test]
    fn test_open_round_trip() {
        let trade = sample_open();
        assert_eq!(decode_open(&encode_open(&trade)), Some(trade));
    }

    #[test]
    fn test_open_round_trip_without_opened_date() {
        let trade = OpenTrade { opened_date: None, ..sample_open() };
        let text = encode_open(&trade);
        assert!(!text.contains(OPENED_DATE));
        assert_eq!(decode_open(&text), Some(trade));
    }

    #[test]
    fn test_open_encoding_order() {
        let text = encode_open(&OpenTrade { opened_date: None, ..sample_open() });
        let labels: Vec<&str> = text.lines().map(|l| l.split(':').next().unwrap()).collect();
        assert_eq!(
            labels,
            [TICKER, ENTRY_PRICE, TAKE_PROFIT, STOP_LOSS, POSITION_SIZE, CURRENT_PRICE]
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_decode_ignores_noise() {
        let text = "# journal\nTicker: ETHUSD\nnote without colon\nEntry Price: 3000\n\
                    Take Profit: 3500\nStop Loss: 2800\nPosition Size: 2\nMood: good\n";
        let trade = decode_open(text).unwrap();
        assert_eq!(trade.ticker, "ETHUSD");
        assert_eq!(trade.current, 3000.0, "current defaults to entry");
        assert_eq!(trade.opened_date, None);
    }

    #[test]
    fn test_decode_rejects_missing_or_non_numeric() {
        assert!(decode_open("Ticker: BTCUSD\nEntry Price: abc\n").is_none());
        assert!(decode_open("just some text").is_none());
        assert!(decode_open("").is_none());
        assert!(decode_closed("Ticker: BTCUSD\nEntry Price: 1\nPosition Size: 1\n").is_none());
    }

    #[test]
    fn test_closed_round_trip() {
        let trade = ClosedTrade {
            ticker:      "SOLUSD".into(),
            entry:       100.0,
            size:        3.5,
            exit:        120.0,
            opened_date: NaiveDate::from_ymd_opt(2024, 12, 30),
            closed_date: NaiveDate::from_ymd_opt(2025, 1, 2),
            filename:    String::new(),
        };
        assert_eq!(decode_closed(&encode_closed(&trade)), Some(trade));
    }

    #[test]
    fn test_closed_unknown_dates() {
        let text = "Ticker: SOLUSD\nEntry Price: 100\nPosition Size: 1\n\
                    Opened Date: N/A\nExit Price: 90\nClosed Date: 01/02/25\n";
        let trade = decode_closed(text).unwrap();
        assert_eq!(trade.opened_date, None);
        assert_eq!(trade.closed_date, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert!(encode_closed(&trade).contains("Opened Date: N/A\n"));
    }

    #[test]
    fn test_closed_decodes_appended_open_text() {
        // An open record with close lines appended, as written by the lifecycle.
        let text = "Ticker: BTCUSD\nEntry Price: 100\nTake Profit: 130\nStop Loss: 90\n\
                    Position Size: 1\nCurrent Price: 100\nOpened Date: 03/05/25\n\
                    Exit Price: 120\nClosed Date: 03/09/25\n";
        let trade = decode_closed(text).unwrap();
        assert_eq!(trade.exit, 120.0);
        assert_eq!(trade.opened_date, NaiveDate::from_ymd_opt(2025, 3, 5));
    }

    #[test]
    fn test_has_label() {
        assert!(has_label("Ticker: X\nOpened Date: 01/01/25\n", OPENED_DATE));
        assert!(!has_label("Ticker: X\n", OPENED_DATE));
    }
}
