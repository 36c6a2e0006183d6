//! # engine::sort
//!
//! Column sorting for the trade tables.
//!
//! Sorts are stable in both directions: descending reverses the comparator,
//! not the slice, so rows with equal keys keep their relative order. Tickers
//! compare case-insensitively, dates by calendar value, and missing numbers
//! or dates sort after every present one (ascending).

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::metrics::{ClosedMetrics, OpenMetrics};
use crate::models::{ClosedTrade, OpenTrade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

// ─── Sort keys ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
}

impl SortKey {
    fn text(value: &str) -> Self {
        SortKey::Text(value.to_uppercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => missing_last(*a, *b, |x, y| {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }),
            (SortKey::Date(a), SortKey::Date(b)) => missing_last(*a, *b, |x, y| x.cmp(y)),
            _ => Ordering::Equal,
        }
    }
}

fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `rows` by the key `key` extracts.
pub fn sort_rows<T>(rows: &mut [T], order: SortOrder, key: impl Fn(&T) -> SortKey) {
    rows.sort_by(|a, b| {
        let ordering = key(a).compare(&key(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

// ─── Columns ──────────────────────────────────────────────────────────────────

/// Sortable columns of the open-trade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenColumn {
    Ticker,
    Entry,
    Current,
    PlPercent,
    PlDollar,
    DistanceToTarget,
    DistanceToStop,
    Equity,
}

impl OpenColumn {
    pub fn key(self, trade: &OpenTrade) -> SortKey {
        let m = OpenMetrics::of(trade);
        match self {
            OpenColumn::Ticker => SortKey::text(&trade.ticker),
            OpenColumn::Entry => SortKey::Number(Some(trade.entry)),
            OpenColumn::Current => SortKey::Number(Some(trade.current)),
            OpenColumn::PlPercent => SortKey::Number(m.pl_percent),
            OpenColumn::PlDollar => SortKey::Number(Some(m.pl_dollar)),
            OpenColumn::DistanceToTarget => SortKey::Number(m.distance_to_target),
            OpenColumn::DistanceToStop => SortKey::Number(m.distance_to_stop),
            OpenColumn::Equity => SortKey::Number(Some(m.equity)),
        }
    }
}

/// Sortable columns of the closed-trade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedColumn {
    Ticker,
    OpenedDate,
    ClosedDate,
    Entry,
    Size,
    Exit,
    GrossProfit,
    NetProfit,
    Duration,
    Fee,
}

impl ClosedColumn {
    pub fn key(self, trade: &ClosedTrade) -> SortKey {
        let m = ClosedMetrics::of(trade);
        match self {
            ClosedColumn::Ticker => SortKey::text(&trade.ticker),
            ClosedColumn::OpenedDate => SortKey::Date(trade.opened_date),
            ClosedColumn::ClosedDate => SortKey::Date(trade.closed_date),
            ClosedColumn::Entry => SortKey::Number(Some(trade.entry)),
            ClosedColumn::Size => SortKey::Number(Some(trade.size)),
            ClosedColumn::Exit => SortKey::Number(Some(trade.exit)),
            ClosedColumn::GrossProfit => SortKey::Number(Some(m.gross_profit)),
            ClosedColumn::NetProfit => SortKey::Number(Some(m.net_profit)),
            ClosedColumn::Duration => SortKey::Number(m.duration_days.map(|d| d as f64)),
            ClosedColumn::Fee => SortKey::Number(Some(m.fee)),
        }
    }
}

// ─── Session sort state ───────────────────────────────────────────────────────

/// Remembers the selected column; choosing it again flips the direction,
/// choosing another column starts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    column: Option<C>,
    order: SortOrder,
}

impl<C> Default for SortState<C> {
    fn default() -> Self {
        Self { column: None, order: SortOrder::Asc }
    }
}

impl<C: Copy + PartialEq> SortState<C> {
    pub fn select(&mut self, column: C) -> SortOrder {
        if self.column == Some(column) {
            self.order = self.order.flipped();
        } else {
            self.column = Some(column);
            self.order = SortOrder::Asc;
        }
        self.order
    }

    pub fn current(&self) -> Option<(C, SortOrder)> {
        self.column.map(|c| (c, self.order))
    }
}
