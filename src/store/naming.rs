//! # store::naming
//!
//! Filenames of trade files.
//!
//! | Kind   | Shape                                   |
//! |--------|-----------------------------------------|
//! | open   | `{BASE}_{YYYYMMDDHHMMSSmmm}.txt` (UTC)  |
//! | closed | `{BASE}_{YYYYMMDDHHMMSSmmm}_closed.txt` |
//!
//! Filenames are storage keys. The only place that still reads meaning out of
//! one is [`opened_date_from_filename`], the fallback for open records written
//! before they carried an `Opened Date` line.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::ticker_base;
use crate::store::StoreError;

pub const EXTENSION: &str = ".txt";
const CLOSED_MARKER: &str = "_closed";

pub fn open_filename(ticker: &str, created_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}{EXTENSION}",
        ticker_base(ticker),
        created_at.format("%Y%m%d%H%M%S%3f")
    )
}

pub fn closed_filename(open_filename: &str) -> String {
    let stem = open_filename.strip_suffix(EXTENSION).unwrap_or(open_filename);
    format!("{stem}{CLOSED_MARKER}{EXTENSION}")
}

/// First eight digits after `{BASE}_`, read as `YYYYMMDD`.
pub fn opened_date_from_filename(filename: &str) -> Option<NaiveDate> {
    let (_, stamp) = filename.split_once('_')?;
    let digits = stamp.get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// Client-supplied names must be bare `.txt` files inside the collection.
pub fn check_filename(filename: &str) -> Result<(), StoreError> {
    let bare = !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
        && filename.len() > EXTENSION.len()
        && filename.ends_with(EXTENSION);

    if bare {
        Ok(())
    } else {
        Err(StoreError::Validation(format!("Invalid trade filename: {filename:?}")))
    }
}
