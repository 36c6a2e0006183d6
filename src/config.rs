//! # config
//!
//! Runtime configuration read from environment variables (a `.env` file is
//! loaded first by `main`).
//!
//! | Variable             | Default                  |
//! |----------------------|--------------------------|
//! | `BIND_ADDR`          | `0.0.0.0:3000`           |
//! | `DATA_DIR`           | `/swinging`              |
//! | `OPEN_DIR`           | `$DATA_DIR/openpos`      |
//! | `CLOSED_DIR`         | `$DATA_DIR/closedpos`    |
//! | `BALANCE_FILE`       | `balance/starting.txt`   |
//! | `PRICE_API_URL`      | `https://api.kraken.com` |
//! | `PRICE_REFRESH_MS`   | `2000`                   |
//! | `PRICE_TIMEOUT_SECS` | `5`                      |
//! | `CLOSED_PAGE_SIZE`   | `15`                     |
//!
//! `PRICE_API_URL=mock` switches the price source to fixed offline quotes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};

/// Value of `PRICE_API_URL` that selects the offline price source.
pub const MOCK_PRICE_URL: &str = "mock";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr:        SocketAddr,
    pub open_dir:         PathBuf,
    pub closed_dir:       PathBuf,
    pub balance_file:     PathBuf,
    /// Base URL of the ticker API, or [`MOCK_PRICE_URL`].
    pub price_api_url:    String,
    pub refresh_interval: Duration,
    pub price_timeout:    Duration,
    pub closed_page_size: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:3000")
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let data_dir = PathBuf::from(env_or("DATA_DIR", "/swinging"));
        let open_dir = std::env::var("OPEN_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("openpos"));
        let closed_dir = std::env::var("CLOSED_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("closedpos"));

        let refresh_ms: u64 = env_or("PRICE_REFRESH_MS", "2000")
            .parse()
            .context("PRICE_REFRESH_MS must be a number of milliseconds")?;
        if refresh_ms == 0 {
            bail!("PRICE_REFRESH_MS must be greater than zero");
        }

        let timeout_secs: u64 = env_or("PRICE_TIMEOUT_SECS", "5")
            .parse()
            .context("PRICE_TIMEOUT_SECS must be a number of seconds")?;

        let closed_page_size: usize = env_or("CLOSED_PAGE_SIZE", "15")
            .parse()
            .context("CLOSED_PAGE_SIZE must be a number")?;
        if closed_page_size == 0 {
            bail!("CLOSED_PAGE_SIZE must be greater than zero");
        }

        Ok(Self {
            bind_addr,
            open_dir,
            closed_dir,
            balance_file:     PathBuf::from(env_or("BALANCE_FILE", "balance/starting.txt")),
            price_api_url:    env_or("PRICE_API_URL", "https://api.kraken.com")
                .trim_end_matches('/')
                .to_string(),
            refresh_interval: Duration::from_millis(refresh_ms),
            price_timeout:    Duration::from_secs(timeout_secs),
            closed_page_size,
        })
    }

    pub fn uses_mock_prices(&self) -> bool {
        self.price_api_url.eq_ignore_ascii_case(MOCK_PRICE_URL)
    }

    /// Config rooted in `root`, offline prices. Used by tests.
    #[cfg(test)]
    pub fn for_root(root: &std::path::Path) -> Self {
        Self {
            bind_addr:        SocketAddr::from(([127, 0, 0, 1], 0)),
            open_dir:         root.join("openpos"),
            closed_dir:       root.join("closedpos"),
            balance_file:     root.join("balance").join("starting.txt"),
            price_api_url:    MOCK_PRICE_URL.to_string(),
            refresh_interval: Duration::from_millis(50),
            price_timeout:    Duration::from_secs(1),
            closed_page_size: 2,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
