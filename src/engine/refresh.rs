//! # engine::refresh
//!
//! The price refresh loop.
//!
//! ```text
//!  interval tick
//!      │
//!      ├─ book.symbols()              one query per distinct ticker
//!      ├─ join_all(feed.last_price)   in parallel, each may fail alone
//!      ├─ book.apply_quotes(ok ones)  failed tickers keep their price
//!      └─ broadcast PRICES_REFRESHED  only when something moved
//! ```
//!
//! The loop only touches the in-memory [`LiveBook`]; nothing is written to the
//! store. It runs until [`RefreshHandle::stop`] is called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::book::LiveBook;
use crate::events::{BookEvent, Quote};
use crate::feed::PriceFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshOutcome {
    pub queried: usize,
    pub failed: usize,
    pub changed: usize,
}

#[derive(Clone)]
pub struct PriceRefresher {
    feed:   Arc<PriceFeed>,
    book:   Arc<LiveBook>,
    events: broadcast::Sender<String>,
    cycles: Arc<AtomicU64>,
}

impl PriceRefresher {
    pub fn new(
        feed: Arc<PriceFeed>,
        book: Arc<LiveBook>,
        events: broadcast::Sender<String>,
        cycles: Arc<AtomicU64>,
    ) -> Self {
        Self { feed, book, events, cycles }
    }

    /// Runs one refresh cycle.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let symbols = self.book.symbols().await;
        if symbols.is_empty() {
            self.cycles.fetch_add(1, Ordering::Relaxed);
            return RefreshOutcome::default();
        }

        let lookups = symbols.iter().map(|symbol| async move {
            (symbol, self.feed.last_price(symbol).await)
        });

        let mut quotes = Vec::with_capacity(symbols.len());
        let mut failed = 0;
        for (symbol, result) in join_all(lookups).await {
            match result {
                Ok(price) => quotes.push((symbol.clone(), price)),
                Err(e) => {
                    failed += 1;
                    warn!(symbol = %symbol, error = %e, "Price refresh failed, keeping last price");
                }
            }
        }

        let changed = self.book.apply_quotes(&quotes).await;
        self.cycles.fetch_add(1, Ordering::Relaxed);

        if changed > 0 {
            let event = BookEvent::PricesRefreshed {
                quotes: quotes
                    .into_iter()
                    .map(|(symbol, price)| Quote { symbol, price })
                    .collect(),
                changed,
            };
            // No subscribers is not an error.
            let _ = self.events.send(event.to_json());
        }

        let outcome = RefreshOutcome { queried: symbols.len(), failed, changed };
        debug!(queried = outcome.queried, failed, changed, "Price refresh cycle");
        outcome
    }

    /// Spawns the periodic loop. The first cycle runs immediately.
    pub fn spawn(self, period: Duration) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, source = self.feed.source_name(), "Price refresher started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.refresh_once().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Price refresher stopped");
        });

        RefreshHandle { stop_tx, task }
    }
}

/// Owner of a running refresh loop.
pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
    task:    JoinHandle<()>,
}

impl RefreshHandle {
    /// Signals the loop and waits for it to finish its current cycle.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Price refresher task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FixedFeed;
    use crate::models::OpenTrade;

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

    async fn setup(prices: &[(&str, f64)]) -> (PriceRefresher, Arc<LiveBook>, broadcast::Receiver<String>) {
        let fixed = FixedFeed::new();
        for (symbol, price) in prices {
            fixed.set(symbol, *price);
        }
        let book = Arc::new(LiveBook::new());
        book.replace(vec![
            trade("BTCUSD", "a.txt", 100.0),
            trade("ETHUSD", "b.txt", 50.0),
            trade("BTCUSD", "c.txt", 90.0),
        ])
        .await;
        let (tx, rx) = broadcast::channel(16);
        let refresher = PriceRefresher::new(
            Arc::new(PriceFeed::Fixed(fixed)),
            Arc::clone(&book),
            tx,
            Arc::new(AtomicU64::new(0)),
        );
        (refresher, book, rx)
    }

    #[tokio::test]
    async fn test_refresh_queries_each_symbol_once() {
        let (refresher, book, mut rx) = setup(&[("BTCUSD", 110.0), ("ETHUSD", 55.0)]).await;

        let outcome = refresher.refresh_once().await;
        assert_eq!(outcome, RefreshOutcome { queried: 2, failed: 0, changed: 3 });

        let rows = book.snapshot().await;
        assert!(rows.iter().filter(|r| r.trade.ticker == "BTCUSD").all(|r| r.trade.current == 110.0));

        let event: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["event"], "PRICES_REFRESHED");
        assert_eq!(event["changed"], 3);
    }

    #[tokio::test]
    async fn test_failing_symbol_keeps_price_and_others_update() {
        let (refresher, book, _rx) = setup(&[("ETHUSD", 60.0)]).await;

        let outcome = refresher.refresh_once().await;
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.changed, 1);

        let rows = book.render().await;
        let btc = rows.iter().find(|r| r.trade.filename == "a.txt").unwrap();
        assert_eq!(btc.trade.current, 100.0);
        assert_eq!(btc.flash, None);
        let eth = rows.iter().find(|r| r.trade.filename == "b.txt").unwrap();
        assert_eq!(eth.trade.current, 60.0);
    }

    #[tokio::test]
    async fn test_no_broadcast_when_nothing_moved() {
        let (refresher, _book, mut rx) = setup(&[]).await;
        let outcome = refresher.refresh_once().await;
        assert_eq!(outcome.changed, 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(refresher.cycles.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_spawned_loop_runs_and_stops() {
        let (refresher, book, _rx) = setup(&[("BTCUSD", 120.0), ("ETHUSD", 50.0)]).await;
        let cycles = Arc::clone(&refresher.cycles);

        let handle = refresher.spawn(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.stop().await;

        let after_stop = cycles.load(Ordering::Relaxed);
        assert!(after_stop >= 1);
        assert_eq!(book.snapshot().await[0].trade.current, 120.0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cycles.load(Ordering::Relaxed), after_stop);
    }
}
