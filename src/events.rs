//! # events
//!
//! [`BookEvent`]: everything broadcast to `/ws/prices` subscribers.
//!
//! Events are serialized once into a JSON `String` and sent through a
//! `tokio::sync::broadcast::Sender<String>`, so every subscriber receives the
//! same text frame.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookEvent {
    /// A refresh cycle moved at least one open trade's price.
    PricesRefreshed {
        quotes: Vec<Quote>,
        changed: usize,
    },

    /// The live book was reloaded from the store after a mutation.
    BookReloaded {
        count: usize,
    },
}

impl BookEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
