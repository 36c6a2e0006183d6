//! # models::date
//!
//! Calendar dates as they appear in trade files and on the wire: `MM/DD/YY`,
//! with `N/A` standing in for a date nobody could determine.

use chrono::NaiveDate;
use serde::Serializer;

/// Written in place of a missing date.
pub const UNKNOWN_DATE: &str = "N/A";

pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%y").to_string()
}

pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Parses `MM/DD/YY`. Two-digit years land in 20YY; four-digit years are
/// taken as-is.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let year_raw = parts.next()?.trim();
    if parts.next().is_some() || year_raw.is_empty() {
        return None;
    }
    if !year_raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = year_raw.parse().ok()?;
    let year = if year_raw.len() <= 2 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn serialize_opt<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_opt_date(*date))
}
