//! # routes
//!
//! HTTP surface of the service. [`router`] wires every endpoint onto the
//! shared state; `main` adds the CORS and tracing layers.

pub mod live;
pub mod reports;
pub mod trades;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ── Trade store ───────────────────────────────────────────────────────
        .route("/open-trades",          get(trades::list_open))
        .route("/closed-trades",        get(trades::list_closed))
        .route("/add-trade",            post(trades::add_trade))
        .route("/edit-trade",           post(trades::edit_trade))
        .route("/close-trade",          post(trades::close_open_trade))
        .route("/delete-trade",         post(trades::delete_trade))
        .route("/edit-closed-trade",    post(trades::edit_closed_trade))
        .route("/delete-closed-trade",  post(trades::delete_closed_trade))
        // ── Reports ───────────────────────────────────────────────────────────
        .route("/starting-balance",     get(reports::starting_balance))
        .route("/closed-trades/report", get(reports::closed_report))
        .route("/summary",              get(reports::portfolio_summary))
        // ── Live session ──────────────────────────────────────────────────────
        .route("/live/open-trades",     get(live::open_board))
        .route("/live/sort",            post(live::select_sort))
        .route("/ws/prices",            get(live::ws_prices))
        .route("/health",               get(live::health))
        .with_state(state)
}
