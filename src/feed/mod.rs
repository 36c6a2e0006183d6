//! # feed
//!
//! Last-trade prices for a ticker pair.
//!
//! ## Sources
//! 1. Kraken public ticker: `GET {base}/0/public/Ticker?pair=BTCUSD`, the
//!    last trade price is `result.<pair>.c[0]`.
//! 2. Fixed: an in-process price table for offline runs (`PRICE_API_URL=mock`)
//!    and tests.
//!
//! Every failure is a [`PriceSourceError`]. Callers treat it as "no quote
//! this cycle" and keep the previous price.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered but reported an error for the pair.
    #[error("price API error: {0}")]
    Api(String),

    #[error("malformed price response: {0}")]
    Malformed(String),
}

pub enum PriceFeed {
    Kraken(KrakenFeed),
    Fixed(FixedFeed),
}

impl PriceFeed {
    pub fn from_config(config: &Config) -> Self {
        if config.uses_mock_prices() {
            tracing::warn!("PRICE_API_URL=mock, serving fixed prices");
            PriceFeed::Fixed(FixedFeed::with_defaults())
        } else {
            PriceFeed::Kraken(KrakenFeed::new(&config.price_api_url, config.price_timeout))
        }
    }

    pub async fn last_price(&self, symbol: &str) -> Result<f64, PriceSourceError> {
        match self {
            PriceFeed::Kraken(feed) => feed.last_price(symbol).await,
            PriceFeed::Fixed(feed) => feed.last_price(symbol),
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            PriceFeed::Kraken(_) => "kraken",
            PriceFeed::Fixed(_) => "fixed",
        }
    }
}

// ─── Kraken ───────────────────────────────────────────────────────────────────

pub struct KrakenFeed {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Duration,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, PairTicker>,
}

#[derive(Debug, Deserialize)]
struct PairTicker {
    /// Last trade closed: `[price, lot volume]`.
    #[serde(default)]
    c: Vec<String>,
}

impl KrakenFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client:   reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub async fn last_price(&self, symbol: &str) -> Result<f64, PriceSourceError> {
        let url = format!("{}/0/public/Ticker", self.base_url);

        let body: TickerResponse = self
            .client
            .get(&url)
            .query(&[("pair", symbol)])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_last_trade(body)
    }
}

/// Kraken keys the result by its own pair name (`XXBTZUSD` for `BTCUSD`), so
/// the single entry is taken whatever its key.
fn parse_last_trade(body: TickerResponse) -> Result<f64, PriceSourceError> {
    if !body.error.is_empty() {
        return Err(PriceSourceError::Api(body.error.join("; ")));
    }

    let ticker = body
        .result
        .into_values()
        .next()
        .ok_or_else(|| PriceSourceError::Malformed("empty result".into()))?;

    let raw = ticker
        .c
        .first()
        .ok_or_else(|| PriceSourceError::Malformed("missing last trade".into()))?;

    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(PriceSourceError::Malformed(format!("bad last trade price {raw:?}"))),
    }
}

// ─── Fixed ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedFeed {
    prices: RwLock<HashMap<String, f64>>,
}

impl FixedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_defaults() -> Self {
        let feed = Self::new();
        for (symbol, price) in [("BTCUSD", 67000.0), ("ETHUSD", 3200.0), ("SOLUSD", 150.0)] {
            feed.set(symbol, price);
        }
        feed
    }

    pub fn set(&self, symbol: &str, price: f64) {
        if let Ok(mut prices) = self.prices.write() {
            prices.insert(symbol.to_string(), price);
        }
    }

    fn last_price(&self, symbol: &str) -> Result<f64, PriceSourceError> {
        let prices = self
            .prices
            .read()
            .map_err(|_| PriceSourceError::Api("price table poisoned".into()))?;
        prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceSourceError::Api(format!("Unknown asset pair: {symbol}")))
    }
}
