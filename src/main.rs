//! # Swingbook: swing trade journal backend
//!
//! ```text
//!  ┌─────────────┐  POST /add-trade · /edit-trade   ┌──────────────────────────┐
//!  │  Dashboard  │  POST /close-trade · /delete-*   │ TradeStore               │
//!  │  (browser)  │ ───────────────────────────────▶ │ ├─ openpos/*.txt         │
//!  └─────────────┘                                  │ └─ closedpos/*.txt       │
//!        ▲  GET /live/open-trades                   └───────────┬──────────────┘
//!        │  GET /closed-trades/report · /summary                │ reload
//!        │                                          ┌───────────▼──────────────┐
//!        │                                          │ LiveBook (live prices)   │
//!        │  ws://host/ws/prices  ◀──── broadcast ── │  ▲                       │
//!        │                                          └──┼───────────────────────┘
//!        │                                             │ apply_quotes
//!        │                                    ┌────────┴─────────┐
//!        │                                    │ PriceRefresher   │──▶ Kraken ticker
//!        └────────────────────────────────────│ (interval task)  │
//!                                             └──────────────────┘
//! ```

use anyhow::Context;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod events;
mod feed;
mod models;
mod routes;
mod state;
mod store;

use config::Config;
use feed::PriceFeed;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("swingbook=debug".parse()?)
                .add_directive("tower_http=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║           SWINGBOOK · Swing Trade Journal             ║
  ║  Open · Close · Live P/L · Realized Profits           ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config & shared state ──────────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.bind_addr;
    let refresh_interval = config.refresh_interval;

    let feed = PriceFeed::from_config(&config);
    let state = build_state(config, feed);

    state
        .store
        .ensure_dirs()
        .await
        .context("Failed to prepare trade folders")?;

    match state.reload_book().await {
        Ok(count) => info!(count, "Live book loaded"),
        Err(e) => warn!(error = %e, "Initial live book load failed"),
    }

    // ── 4. Price refresher ────────────────────────────────────────────────────
    let refresher = state.refresher().spawn(refresh_interval);

    // ── 5. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 6. Router ─────────────────────────────────────────────────────────────
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── 7. Bind & Serve ───────────────────────────────────────────────────────
    info!(?addr, "🚀 Swingbook server starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.stop().await;
    info!("Swingbook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
