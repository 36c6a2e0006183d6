//! # engine::book
//!
//! [`LiveBook`]: the in-memory projection of the open collection with live
//! prices.
//!
//! Two writers touch it, the price refresher ([`LiveBook::apply_quotes`]) and
//! store reloads after a mutation ([`LiveBook::replace`]). Both go through
//! one `RwLock`, so they are applied one after the other. A reload merges by
//! filename and keeps live prices already quoted for surviving trades whose
//! ticker did not change. The book never writes back to the store.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::engine::sort::{sort_rows, OpenColumn, SortOrder, SortState};
use crate::models::OpenTrade;

/// Direction of the last price change, shown once and then cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flash {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTrade {
    #[serde(flatten)]
    pub trade: OpenTrade,
    /// Whether `trade.current` came from the price source rather than the file.
    pub quoted: bool,
    pub flash: Option<Flash>,
}

impl LiveTrade {
    fn fresh(trade: OpenTrade) -> Self {
        Self { trade, quoted: false, flash: None }
    }
}

#[derive(Default)]
struct BookInner {
    trades: Vec<LiveTrade>,
    sort: SortState<OpenColumn>,
}

impl BookInner {
    fn apply_sort(&mut self) {
        if let Some((column, order)) = self.sort.current() {
            sort_rows(&mut self.trades, order, |t| column.key(&t.trade));
        }
    }
}

#[derive(Default)]
pub struct LiveBook {
    inner: RwLock<BookInner>,
}

impl LiveBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the book with a fresh listing of the open collection.
    ///
    /// Trades that were already quoted keep their live price and any pending
    /// flash. New trades, and trades edited onto another ticker, start at the
    /// stored price.
    pub async fn replace(&self, listed: Vec<OpenTrade>) {
        let mut inner = self.inner.write().await;

        let mut previous: HashMap<String, LiveTrade> = inner
            .trades
            .drain(..)
            .map(|t| (t.trade.filename.clone(), t))
            .collect();

        inner.trades = listed
            .into_iter()
            .map(|trade| match previous.remove(&trade.filename) {
                Some(old) if old.quoted && old.trade.ticker == trade.ticker => LiveTrade {
                    trade: OpenTrade { current: old.trade.current, ..trade },
                    quoted: true,
                    flash: old.flash,
                },
                _ => LiveTrade::fresh(trade),
            })
            .collect();

        inner.apply_sort();
    }

    /// Distinct tickers in the book, in first-seen order.
    pub async fn symbols(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut seen = HashSet::new();
        inner
            .trades
            .iter()
            .filter(|t| seen.insert(t.trade.ticker.as_str()))
            .map(|t| t.trade.ticker.clone())
            .collect()
    }

    /// Applies `(ticker, price)` quotes to every trade on that ticker.
    /// Returns how many trades changed price.
    pub async fn apply_quotes(&self, quotes: &[(String, f64)]) -> usize {
        if quotes.is_empty() {
            return 0;
        }
        let prices: HashMap<&str, f64> = quotes.iter().map(|(s, p)| (s.as_str(), *p)).collect();

        let mut inner = self.inner.write().await;
        let mut changed = 0;
        for live in inner.trades.iter_mut() {
            let Some(&price) = prices.get(live.trade.ticker.as_str()) else {
                continue;
            };
            live.quoted = true;
            if price == live.trade.current {
                continue;
            }
            live.flash = Some(if price > live.trade.current { Flash::Up } else { Flash::Down });
            live.trade.current = price;
            changed += 1;
        }

        if changed > 0 {
            inner.apply_sort();
        }
        changed
    }

    /// Current rows for display. Consumes the one-shot flashes.
    pub async fn render(&self) -> Vec<LiveTrade> {
        let mut inner = self.inner.write().await;
        inner
            .trades
            .iter_mut()
            .map(|live| {
                let row = live.clone();
                live.flash = None;
                row
            })
            .collect()
    }

    /// Current rows without touching the flashes.
    pub async fn snapshot(&self) -> Vec<LiveTrade> {
        self.inner.read().await.trades.clone()
    }

    /// Selects a sort column (toggling on repeat) and re-sorts the book.
    pub async fn select_sort(&self, column: OpenColumn) -> SortOrder {
        let mut inner = self.inner.write().await;
        let order = inner.sort.select(column);
        inner.apply_sort();
        order
    }

    pub async fn sort(&self) -> Option<(OpenColumn, SortOrder)> {
        self.inner.read().await.sort.current()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.trades.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(ticker: &str, filename: &str, entry: f64) -> OpenTrade {
        OpenTrade {
            ticker:      ticker.into(),
            entry,
            take_profit: entry * 2.0,
            stop_loss:   entry / 2.0,
            size:        1.0,
            current:     entry,
            opened_date: None,
            filename:    filename.into(),
        }
    }

    fn currents(rows: &[LiveTrade]) -> Vec<f64> {
        rows.iter().map(|t| t.trade.current).collect()
    }

    #[tokio::test]
    async fn test_quotes_update_price_and_flash_once() {
        let book = LiveBook::new();
        book.replace(vec![trade("BTCUSD", "a.txt", 100.0), trade("ETHUSD", "b.txt", 50.0)])
            .await;

        let changed = book
            .apply_quotes(&[("BTCUSD".into(), 110.0), ("ETHUSD".into(), 40.0)])
            .await;
        assert_eq!(changed, 2);

        let rows = book.render().await;
        assert_eq!(currents(&rows), [110.0, 40.0]);
        assert_eq!(rows[0].flash, Some(Flash::Up));
        assert_eq!(rows[1].flash, Some(Flash::Down));

        // The flag is one-shot.
        let rows = book.render().await;
        assert!(rows.iter().all(|r| r.flash.is_none()));
        assert_eq!(currents(&rows), [110.0, 40.0]);
    }

    #[tokio::test]
    async fn test_unchanged_quote_does_not_flash() {
        let book = LiveBook::new();
        book.replace(vec![trade("BTCUSD", "a.txt", 100.0)]).await;

        assert_eq!(book.apply_quotes(&[("BTCUSD".into(), 100.0)]).await, 0);
        let rows = book.render().await;
        assert_eq!(rows[0].flash, None);
        assert!(rows[0].quoted);
    }

    #[tokio::test]
    async fn test_reload_keeps_live_prices_of_surviving_trades() {
        let book = LiveBook::new();
        book.replace(vec![trade("BTCUSD", "a.txt", 100.0), trade("ETHUSD", "b.txt", 50.0)])
            .await;
        book.apply_quotes(&[("BTCUSD".into(), 120.0)]).await;

        // b.txt closed, c.txt added, a.txt edited on disk.
        let mut edited = trade("BTCUSD", "a.txt", 101.0);
        edited.size = 3.0;
        book.replace(vec![edited, trade("SOLUSD", "c.txt", 20.0)]).await;

        let rows = book.snapshot().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].trade.current, 120.0);
        assert_eq!(rows[0].trade.size, 3.0);
        assert_eq!(rows[0].trade.entry, 101.0);
        assert_eq!(rows[0].flash, Some(Flash::Up));
        assert_eq!(rows[1].trade.current, 20.0);
        assert!(!rows[1].quoted);
    }

    #[tokio::test]
    async fn test_reload_drops_live_price_when_ticker_changes() {
        let book = LiveBook::new();
        book.replace(vec![trade("BTCUSD", "a.txt", 67000.0)]).await;
        book.apply_quotes(&[("BTCUSD".into(), 68000.0)]).await;

        // a.txt edited from BTC to ETH.
        book.replace(vec![trade("ETHUSD", "a.txt", 3000.0)]).await;

        let rows = book.snapshot().await;
        assert_eq!(rows[0].trade.ticker, "ETHUSD");
        assert_eq!(rows[0].trade.current, 3000.0);
        assert!(!rows[0].quoted);
        assert_eq!(rows[0].flash, None);

        // A failed ETH quote leaves the stored price in place.
        book.apply_quotes(&[("BTCUSD".into(), 69000.0)]).await;
        assert_eq!(book.snapshot().await[0].trade.current, 3000.0);
    }

    #[tokio::test]
    async fn test_symbols_are_unique() {
        let book = LiveBook::new();
        book.replace(vec![
            trade("BTCUSD", "a.txt", 1.0),
            trade("ETHUSD", "b.txt", 1.0),
            trade("BTCUSD", "c.txt", 1.0),
        ])
        .await;
        assert_eq!(book.symbols().await, ["BTCUSD", "ETHUSD"]);
    }

    #[tokio::test]
    async fn test_sort_is_kept_across_updates() {
        let book = LiveBook::new();
        book.replace(vec![trade("BTCUSD", "a.txt", 100.0), trade("ETHUSD", "b.txt", 50.0)])
            .await;

        assert_eq!(book.select_sort(OpenColumn::Current).await, SortOrder::Asc);
        assert_eq!(currents(&book.snapshot().await), [50.0, 100.0]);

        // ETH overtakes BTC: the book re-sorts itself.
        book.apply_quotes(&[("ETHUSD".into(), 150.0)]).await;
        assert_eq!(currents(&book.snapshot().await), [100.0, 150.0]);

        assert_eq!(book.select_sort(OpenColumn::Current).await, SortOrder::Desc);
        assert_eq!(currents(&book.snapshot().await), [150.0, 100.0]);
        assert_eq!(book.sort().await, Some((OpenColumn::Current, SortOrder::Desc)));
    }
}
