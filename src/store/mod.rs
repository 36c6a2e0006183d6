//! # store
//!
//! File-backed trade store: two folders of text files, one per trade.
//!
//! ```text
//! $DATA_DIR/
//!   openpos/    BTC_20250305140709042.txt
//!   closedpos/  ETH_20250101090000000_closed.txt
//! ```
//!
//! Each file is the only durable owner of its trade. Operations validate and
//! check existence before touching the disk; nothing is retried.

pub mod codec;
pub mod collection;
pub mod error;
pub mod naming;
pub mod validate;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{ClosedTrade, ClosedTradeInput, OpenTrade, OpenTradeInput};

pub use collection::Collection;
pub use error::StoreError;

pub struct TradeStore {
    pub open: Collection<OpenTrade>,
    pub closed: Collection<ClosedTrade>,
}

impl TradeStore {
    pub fn new(open_dir: impl Into<PathBuf>, closed_dir: impl Into<PathBuf>) -> Self {
        Self {
            open: Collection::new(open_dir),
            closed: Collection::new(closed_dir),
        }
    }

    pub async fn ensure_dirs(&self) -> Result<(), StoreError> {
        self.open.ensure_dir().await?;
        self.closed.ensure_dir().await
    }

    // ─── Open collection ──────────────────────────────────────────────────────

    pub async fn list_open(&self) -> Result<Vec<OpenTrade>, StoreError> {
        self.open.list().await
    }

    /// Persists a new open trade and returns its filename.
    ///
    /// The opened date is the UTC date of `created_at`, the same instant the
    /// filename timestamp encodes.
    pub async fn create_open(
        &self,
        input: &OpenTradeInput,
        created_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let mut trade = validate::open_trade(input)?;
        trade.opened_date = Some(created_at.date_naive());

        let filename = naming::open_filename(&trade.ticker, created_at);
        self.open.insert(&filename, &trade).await?;

        info!(filename = %filename, ticker = %trade.ticker, entry = trade.entry, size = trade.size, "Trade added");
        Ok(filename)
    }

    /// Rewrites the whole record from `input`. The current price resets to
    /// the entry price; the recorded opened date is carried over.
    pub async fn update_open(&self, filename: &str, input: &OpenTradeInput) -> Result<(), StoreError> {
        naming::check_filename(filename)?;
        let mut trade = validate::open_trade(input)?;

        let existing = self.open.read_raw(filename).await?;
        trade.opened_date = codec::decode_open(&existing).and_then(|t| t.opened_date);

        self.open.write_text(filename, &codec::encode_open(&trade)).await?;
        info!(filename, ticker = %trade.ticker, "Trade updated");
        Ok(())
    }

    pub async fn delete_open(&self, filename: &str) -> Result<(), StoreError> {
        self.open.remove(filename).await?;
        info!(filename, "Open trade deleted");
        Ok(())
    }

    // ─── Closed collection ────────────────────────────────────────────────────

    pub async fn list_closed(&self) -> Result<Vec<ClosedTrade>, StoreError> {
        self.closed.list().await
    }

    pub async fn update_closed(&self, filename: &str, input: &ClosedTradeInput) -> Result<(), StoreError> {
        naming::check_filename(filename)?;
        let trade = validate::closed_trade(input)?;
        self.closed.replace(filename, &trade).await?;
        info!(filename, ticker = %trade.ticker, "Closed trade updated");
        Ok(())
    }

    pub async fn delete_closed(&self, filename: &str) -> Result<(), StoreError> {
        self.closed.remove(filename).await?;
        info!(filename, "Closed trade deleted");
        Ok(())
    }
}
