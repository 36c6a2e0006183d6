//! # routes::live
//!
//! The live session view of open trades.
//!
//! | Method   | Path                | Description                                    |
//! |----------|---------------------|------------------------------------------------|
//! | GET      | `/live/open-trades` | rows with live prices, metrics, flashes        |
//! | POST     | `/live/sort`        | `{column}`: select / toggle the sort column    |
//! | GET (WS) | `/ws/prices`        | snapshot, then `PRICES_REFRESHED` / `BOOK_RELOADED` |
//! | GET      | `/health`           | book size and refresh cycle count              |

use std::sync::atomic::Ordering;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    engine::{report::OpenBoard, sort::OpenColumn},
    error::AppError,
    state::SharedState,
};

// ─── Board ────────────────────────────────────────────────────────────────────

/// GET /live/open-trades. Reading the board consumes the flashes.
pub async fn open_board(State(state): State<SharedState>) -> impl IntoResponse {
    let rows = state.book.render().await;
    let sort = state.book.sort().await;
    Json(OpenBoard::new(rows, sort))
}

#[derive(Debug, Deserialize)]
pub struct SortBody {
    pub column: Option<String>,
}

/// POST /live/sort
pub async fn select_sort(
    State(state): State<SharedState>,
    body: Result<Json<SortBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let raw = body
        .column
        .ok_or_else(|| AppError::BadRequest("Missing sort column".into()))?;
    let column: OpenColumn = serde_json::from_value(serde_json::Value::String(raw.clone()))
        .map_err(|_| AppError::BadRequest(format!("Unknown sort column: {raw}")))?;

    let order = state.book.select_sort(column).await;
    Ok(Json(json!({
        "ok":     true,
        "column": column,
        "order":  order,
    })))
}

// ─── WebSocket ────────────────────────────────────────────────────────────────

/// GET /ws/prices
pub async fn ws_prices(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("Price stream client connected");

    // ── Snapshot first ────────────────────────────────────────────────────────
    let snapshot = json!({
        "event":  "SNAPSHOT",
        "trades": state.book.snapshot().await,
        "cycles": state.refresh_cycles.load(Ordering::Relaxed),
    })
    .to_string();

    if sender.send(Message::Text(snapshot)).await.is_err() {
        return;
    }

    // ── Event loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str)).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!("Price stream client lagged, skipped {n} events");
                    }
                    Err(_) => break,
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Price stream client disconnected");
}

// ─── Health ───────────────────────────────────────────────────────────────────

/// GET /health
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":             true,
        "service":        "swingbook",
        "open_trades":    state.book.len().await,
        "refresh_cycles": state.refresh_cycles.load(Ordering::Relaxed),
        "price_source":   state.feed.source_name(),
    }))
}
