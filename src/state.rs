//! # state
//!
//! [`AppState`]: shared by every handler through `State<SharedState>`.
//!
//! The trade store is stateless (every call hits the disk). The only
//! in-memory state is the [`LiveBook`], which the refresher and store reloads
//! write through its own lock. Reloads also take `reload_lock` for the whole
//! list-then-replace, so a slow listing can never land after a newer one.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use crate::config::Config;
use crate::engine::{LiveBook, PriceRefresher};
use crate::events::BookEvent;
use crate::feed::PriceFeed;
use crate::store::{StoreError, TradeStore};

/// Capacity of the `/ws/prices` broadcast channel.
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // ── Persistence ───────────────────────────────────────────────────────────
    pub store: Arc<TradeStore>,

    // ── Live projection ───────────────────────────────────────────────────────
    /// Open trades with live prices, the session sort and pending flashes.
    pub book: Arc<LiveBook>,
    pub feed: Arc<PriceFeed>,
    pub reload_lock: Arc<Mutex<()>>,

    // ── Monitor / WebSocket ───────────────────────────────────────────────────
    /// Pre-serialized [`BookEvent`] JSON for `/ws/prices` subscribers.
    pub broadcast_tx: broadcast::Sender<String>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub refresh_cycles: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: Config, feed: PriceFeed) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let store = TradeStore::new(&config.open_dir, &config.closed_dir);

        Self {
            config:         Arc::new(config),
            store:          Arc::new(store),
            book:           Arc::new(LiveBook::new()),
            feed:           Arc::new(feed),
            reload_lock:    Arc::new(Mutex::new(())),
            broadcast_tx,
            refresh_cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sends an event to every WebSocket subscriber. Having none is fine.
    pub fn broadcast(&self, event: &BookEvent) {
        let _ = self.broadcast_tx.send(event.to_json());
    }

    /// Re-lists the open collection into the live book.
    pub async fn reload_book(&self) -> Result<usize, StoreError> {
        let _guard = self.reload_lock.lock().await;
        let listed = self.store.list_open().await?;
        let count = listed.len();
        self.book.replace(listed).await;
        self.broadcast(&BookEvent::BookReloaded { count });
        Ok(count)
    }

    /// Reload after a mutation. The mutation already succeeded, so a failed
    /// listing is only logged; the next reload catches up.
    pub async fn reload_book_after_change(&self) {
        if let Err(e) = self.reload_book().await {
            warn!(error = %e, "Live book reload failed");
        }
    }

    pub fn refresher(&self) -> PriceRefresher {
        PriceRefresher::new(
            Arc::clone(&self.feed),
            Arc::clone(&self.book),
            self.broadcast_tx.clone(),
            Arc::clone(&self.refresh_cycles),
        )
    }
}

pub type SharedState = Arc<AppState>;

pub fn build_state(config: Config, feed: PriceFeed) -> SharedState {
    Arc::new(AppState::new(config, feed))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::feed::FixedFeed;
    use crate::models::OpenTradeInput;

    fn input(ticker: &str) -> OpenTradeInput {
        OpenTradeInput {
            ticker:      Some(ticker.into()),
            entry:       Some(100.0),
            take_profit: Some(130.0),
            stop_loss:   Some(90.0),
            size:        Some(1.0),
        }
    }

    #[tokio::test]
    async fn test_reload_lists_only_after_earlier_reload_finishes() {
        let root = std::env::temp_dir().join(format!("swingbook_state_{}", uuid::Uuid::new_v4()));
        let state = build_state(Config::for_root(&root), PriceFeed::Fixed(FixedFeed::new()));
        state.store.ensure_dirs().await.unwrap();

        let first = state.store.create_open(&input("btc"), Utc::now()).await.unwrap();
        state.store.create_open(&input("eth"), Utc::now()).await.unwrap();
        assert_eq!(state.reload_book().await.unwrap(), 2);

        // While another reload holds the lock, a pending one must not list yet.
        let guard = state.reload_lock.lock().await;
        let pending = tokio::spawn({
            let state = Arc::clone(&state);
            async move { state.reload_book().await }
        });
        tokio::task::yield_now().await;
        state.store.delete_open(&first).await.unwrap();
        assert_eq!(state.book.len().await, 2);
        drop(guard);

        assert_eq!(pending.await.unwrap().unwrap(), 1);
        assert_eq!(state.book.len().await, 1);
        assert_eq!(state.book.symbols().await, ["ETHUSD"]);

        let _ = std::fs::remove_dir_all(root);
    }
}
