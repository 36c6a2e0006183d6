//! # routes::reports
//!
//! Read-only views over the closed collection and the balance file.
//!
//! | Method | Path                       | Description                               |
//! |--------|----------------------------|-------------------------------------------|
//! | GET    | `/starting-balance`        | `{balance}` read verbatim (trimmed)       |
//! | GET    | `/closed-trades/report`    | sorted, paginated closed table + summary  |
//! | GET    | `/summary`                 | balance, live open summary, closed summary|

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{
    engine::{
        metrics::{ClosedSummary, OpenSummary},
        report::{ClosedReport, ClosedSummaryDisplay, OpenSummaryDisplay, ReportQuery},
    },
    error::AppError,
    state::{AppState, SharedState},
};

async fn read_balance(state: &AppState) -> Result<String, AppError> {
    let path = &state.config.balance_file;
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read starting balance");
            Err(AppError::Storage("Failed to read starting balance".into()))
        }
    }
}

/// GET /starting-balance
pub async fn starting_balance(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let balance = read_balance(&state).await?;
    Ok(Json(json!({ "balance": balance })))
}

/// GET /closed-trades/report?sort=net_profit&order=desc&page=0
pub async fn closed_report(
    State(state): State<SharedState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trades = state.store.list_closed().await?;
    let report = ClosedReport::build(trades, query, state.config.closed_page_size);
    Ok(Json(report))
}

/// GET /summary
///
/// The open side uses live prices from the book. A missing balance file does
/// not fail the summary; `balance` is `null` then.
pub async fn portfolio_summary(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let closed = state.store.list_closed().await?;
    let closed_summary = ClosedSummary::of(&closed);

    let live = state.book.snapshot().await;
    let open_summary = OpenSummary::of(live.iter().map(|l| &l.trade));

    let balance = read_balance(&state).await.ok();

    Ok(Json(json!({
        "ok":      true,
        "balance": balance,
        "open": {
            "summary": open_summary,
            "display": OpenSummaryDisplay::of(&open_summary),
        },
        "closed": {
            "summary": closed_summary,
            "display": ClosedSummaryDisplay::of(&closed_summary),
        },
    })))
}
