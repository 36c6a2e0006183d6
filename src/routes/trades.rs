//! # routes::trades
//!
//! Trade store endpoints used by the dashboard forms.
//!
//! | Method | Path                   | Body                                                      |
//! |--------|------------------------|-----------------------------------------------------------|
//! | GET    | `/open-trades`         |                                                           |
//! | GET    | `/closed-trades`       |                                                           |
//! | POST   | `/add-trade`           | `{ticker, entry, tp, sl, size}`                           |
//! | POST   | `/edit-trade`          | `{ticker, entry, tp, sl, size, filename}`                 |
//! | POST   | `/close-trade`         | `{exit, filename}`                                        |
//! | POST   | `/delete-trade`        | `{filename}`                                              |
//! | POST   | `/edit-closed-trade`   | `{ticker, entry, size, opened_date, exit, closed_date, filename}` |
//! | POST   | `/delete-closed-trade` | `{filename}`                                              |
//!
//! Every successful mutation of the open collection reloads the live book.
//! A body that does not deserialize is a 400, the same as a missing field.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    engine::lifecycle::close_trade,
    error::AppError,
    models::{input::lenient_number, ClosedTradeInput, OpenTradeInput},
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct EditTradeBody {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub trade: OpenTradeInput,
}

#[derive(Debug, Deserialize)]
pub struct EditClosedTradeBody {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub trade: ClosedTradeInput,
}

#[derive(Debug, Deserialize)]
pub struct CloseTradeBody {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub exit: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FilenameBody {
    #[serde(default)]
    pub filename: Option<String>,
}

fn require_filename(filename: Option<String>) -> Result<String, AppError> {
    filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing filename".into()))
}

// ─── Listings ─────────────────────────────────────────────────────────────────

/// GET /open-trades
pub async fn list_open(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_open().await?))
}

/// GET /closed-trades
pub async fn list_closed(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_closed().await?))
}

// ─── Open trades ──────────────────────────────────────────────────────────────

/// POST /add-trade
pub async fn add_trade(
    State(state): State<SharedState>,
    body: Result<Json<OpenTradeInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = state.store.create_open(&body, Utc::now()).await?;
    state.reload_book_after_change().await;

    Ok(Json(json!({
        "ok":       true,
        "message":  "Trade added",
        "filename": filename,
    })))
}

/// POST /edit-trade
pub async fn edit_trade(
    State(state): State<SharedState>,
    body: Result<Json<EditTradeBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = require_filename(body.filename)?;
    state.store.update_open(&filename, &body.trade).await?;
    state.reload_book_after_change().await;

    Ok(Json(json!({
        "ok":       true,
        "message":  "Trade updated",
        "filename": filename,
    })))
}

/// POST /close-trade
///
/// The closed date is the server's local calendar date.
pub async fn close_open_trade(
    State(state): State<SharedState>,
    body: Result<Json<CloseTradeBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = require_filename(body.filename)?;
    let today = Local::now().date_naive();

    let closed_filename = close_trade(&state.store, &filename, body.exit, today).await?;
    state.reload_book_after_change().await;

    Ok(Json(json!({
        "ok":             true,
        "message":        "Trade closed successfully",
        "closedFilename": closed_filename,
    })))
}

/// POST /delete-trade
pub async fn delete_trade(
    State(state): State<SharedState>,
    body: Result<Json<FilenameBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = require_filename(body.filename)?;
    state.store.delete_open(&filename).await?;
    state.reload_book_after_change().await;

    Ok(Json(json!({
        "ok":      true,
        "message": "Trade deleted successfully",
    })))
}

// ─── Closed trades ────────────────────────────────────────────────────────────

/// POST /edit-closed-trade
pub async fn edit_closed_trade(
    State(state): State<SharedState>,
    body: Result<Json<EditClosedTradeBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = require_filename(body.filename)?;
    state.store.update_closed(&filename, &body.trade).await?;

    Ok(Json(json!({
        "ok":       true,
        "message":  "Closed trade updated",
        "filename": filename,
    })))
}

/// POST /delete-closed-trade
pub async fn delete_closed_trade(
    State(state): State<SharedState>,
    body: Result<Json<FilenameBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let filename = require_filename(body.filename)?;
    state.store.delete_closed(&filename).await?;

    Ok(Json(json!({
        "ok":      true,
        "message": "Closed trade deleted successfully",
    })))
}
