//! # engine::lifecycle
//!
//! The open → closed transition.
//!
//! ```text
//! openpos/BTC_20250305140709042.txt
//!     │  read raw text
//!     │  append  Opened Date (if absent) · Exit Price · Closed Date
//!     ▼
//! closedpos/BTC_20250305140709042_closed.txt   ← written and synced first
//!     │
//!     └─ delete openpos/BTC_20250305140709042.txt
//! ```
//!
//! Write-then-delete: a crash or failure between the two steps leaves the
//! trade in both folders, never in neither. A failed write aborts before the
//! open file is touched.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::models::date::{format_date, format_opt_date};
use crate::store::{codec, naming, validate, StoreError, TradeStore};

/// Closes the open trade `filename` at `exit`, dated `today`.
/// Returns the filename of the new closed record.
pub async fn close_trade(
    store: &TradeStore,
    filename: &str,
    exit: Option<f64>,
    today: NaiveDate,
) -> Result<String, StoreError> {
    naming::check_filename(filename)?;
    let exit = validate::exit_price(exit)?;

    // ── 1. Raw open record ────────────────────────────────────────────────────
    let raw = store.open.read_raw(filename).await?;

    // ── 2. Append close lines to the verbatim open text ──────────────────────
    let mut text = raw;
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    if !codec::has_label(&text, codec::OPENED_DATE) {
        let opened = naming::opened_date_from_filename(filename);
        if opened.is_none() {
            warn!(filename, "Opened date unknown, closing with N/A");
        }
        text.push_str(&codec::line(codec::OPENED_DATE, format_opt_date(opened)));
    }
    text.push_str(&codec::line(codec::EXIT_PRICE, exit));
    text.push_str(&codec::line(codec::CLOSED_DATE, format_date(today)));

    // ── 3. Write the closed record (abort here on failure) ───────────────────
    let closed_filename = naming::closed_filename(filename);
    store.closed.write_text(&closed_filename, &text).await?;

    // ── 4. Remove the open record ────────────────────────────────────────────
    if let Err(e) = store.open.remove(filename).await {
        error!(
            filename,
            closed_filename = %closed_filename,
            error = %e,
            "Closed record written but open record not removed; trade is now in both folders"
        );
        return Err(e);
    }

    info!(filename, closed_filename = %closed_filename, exit, "Trade closed");
    Ok(closed_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    use crate::models::OpenTradeInput;

    fn temp_store() -> (TradeStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("swingbook_lifecycle_{}", uuid::Uuid::new_v4()));
        let store = TradeStore::new(root.join("openpos"), root.join("closedpos"));
        (store, root)
    }

    fn input() -> OpenTradeInput {
        OpenTradeInput {
            ticker:      Some("btc".into()),
            entry:       Some(100.0),
            take_profit: Some(130.0),
            stop_loss:   Some(90.0),
            size:        Some(1.0),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[tokio::test]
    async fn test_close_moves_trade_and_dates_it() {
        let (store, root) = temp_store();
        store.ensure_dirs().await.unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 14, 7, 9).unwrap();
        let filename = store.create_open(&input(), at).await.unwrap();

        let closed_filename = close_trade(&store, &filename, Some(120.0), today()).await.unwrap();
        assert_eq!(closed_filename, "BTC_20250305140709000_closed.txt");

        assert!(store.list_open().await.unwrap().is_empty());
        let closed = store.list_closed().await.unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].ticker, "BTCUSD");
        assert_eq!(closed[0].exit, 120.0);
        assert_eq!(closed[0].opened_date, NaiveDate::from_ymd_opt(2025, 3, 5));
        assert_eq!(closed[0].closed_date, Some(today()));
        assert_eq!(closed[0].filename, closed_filename);

        // Opened Date is not duplicated when the open record already had it.
        let raw = store.closed.read_raw(&closed_filename).await.unwrap();
        assert_eq!(raw.matches("Opened Date:").count(), 1);
        assert!(raw.starts_with("Ticker: BTCUSD\nEntry Price: 100\n"));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_legacy_record_takes_date_from_filename() {
        let (store, root) = temp_store();
        store.ensure_dirs().await.unwrap();
        let legacy = "Ticker: ETHUSD\nEntry Price: 3000\nTake Profit: 3500\nStop Loss: 2800\n\
                      Position Size: 2\nCurrent Price: 3000";
        store.open.write_text("ETH_20240115093000000.txt", legacy).await.unwrap();

        let closed_filename = close_trade(&store, "ETH_20240115093000000.txt", Some(3100.0), today())
            .await
            .unwrap();

        let raw = store.closed.read_raw(&closed_filename).await.unwrap();
        assert!(raw.contains("Current Price: 3000\nOpened Date: 01/15/24\nExit Price: 3100\nClosed Date: 03/09/25\n"));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_unparseable_filename_degrades_to_unknown_date() {
        let (store, root) = temp_store();
        store.ensure_dirs().await.unwrap();
        let legacy = "Ticker: ETHUSD\nEntry Price: 3000\nTake Profit: 3500\nStop Loss: 2800\nPosition Size: 2\n";
        store.open.write_text("manual.txt", legacy).await.unwrap();

        let closed_filename = close_trade(&store, "manual.txt", Some(2900.0), today()).await.unwrap();
        assert_eq!(closed_filename, "manual_closed.txt");

        let closed = &store.list_closed().await.unwrap()[0];
        assert_eq!(closed.opened_date, None);
        assert_eq!(closed.closed_date, Some(today()));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_open_record() {
        let (store, root) = temp_store();
        // Only the open folder exists, so writing the closed record fails.
        store.open.ensure_dir().await.unwrap();
        let filename = store.create_open(&input(), Utc::now()).await.unwrap();

        let err = close_trade(&store, &filename, Some(120.0), today()).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(store.open.contains(&filename).await.unwrap());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_unknown_open_filename_is_not_found() {
        let (store, root) = temp_store();
        store.ensure_dirs().await.unwrap();

        let err = close_trade(&store, "BTC_1.txt", Some(1.0), today()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.list_closed().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_missing_exit_is_rejected_before_reading() {
        let (store, root) = temp_store();
        store.ensure_dirs().await.unwrap();
        let filename = store.create_open(&input(), Utc::now()).await.unwrap();

        let err = close_trade(&store, &filename, None, today()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.open.contains(&filename).await.unwrap());

        let _ = std::fs::remove_dir_all(root);
    }
}
