//! # engine::metrics
//!
//! Derived values for trades: per-row P/L, fees and durations, plus the
//! aggregate summaries shown under each table.
//!
//! Pure functions of the records. Nothing is stored; every read recomputes.
//! Divisions by zero yield `None` (rows) or `0` (summaries) so no NaN or
//! infinity ever reaches a response.

use serde::Serialize;

use crate::models::{ClosedTrade, OpenTrade};

/// Fee charged on the exit notional of a closed trade (0.4 %).
pub const FEE_RATE: f64 = 0.004;

// ─── Per-trade ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpenMetrics {
    pub pl_percent: Option<f64>,
    pub pl_dollar: f64,
    /// Percent the price still has to travel up to the take-profit.
    pub distance_to_target: Option<f64>,
    /// Percent of headroom above the stop-loss.
    pub distance_to_stop: Option<f64>,
    pub equity: f64,
}

impl OpenMetrics {
    pub fn of(trade: &OpenTrade) -> Self {
        let change = trade.current - trade.entry;
        Self {
            pl_percent:         percent_of(change, trade.entry),
            pl_dollar:          change * trade.size,
            distance_to_target: percent_of(trade.take_profit - trade.current, trade.current),
            distance_to_stop:   percent_of(trade.current - trade.stop_loss, trade.current),
            equity:             trade.entry * trade.size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosedMetrics {
    pub gross_profit: f64,
    pub fee: f64,
    pub net_profit: f64,
    /// Whole days between the two dates; `None` when either is unknown.
    pub duration_days: Option<i64>,
}

impl ClosedMetrics {
    pub fn of(trade: &ClosedTrade) -> Self {
        let gross_profit = (trade.exit - trade.entry) * trade.size;
        let fee = trade.exit * trade.size * FEE_RATE;
        let duration_days = match (trade.opened_date, trade.closed_date) {
            (Some(opened), Some(closed)) => Some((closed - opened).num_days().abs()),
            _ => None,
        };

        Self {
            gross_profit,
            fee,
            net_profit: gross_profit - fee,
            duration_days,
        }
    }
}

/// `numerator / denominator × 100`, `None` for a zero denominator.
fn percent_of(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator * 100.0;
    value.is_finite().then_some(value)
}

// ─── Aggregates ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OpenSummary {
    pub count: usize,
    pub total_equity: f64,
    pub cum_pl_dollar: f64,
    pub cum_pl_percent: f64,
    /// Equity plus unrealized P/L.
    pub liquid_value: f64,
}

impl OpenSummary {
    pub fn of<'a>(trades: impl IntoIterator<Item = &'a OpenTrade>) -> Self {
        let mut count = 0;
        let mut entry_value = 0.0;
        let mut current_value = 0.0;

        for trade in trades {
            count += 1;
            entry_value += trade.entry * trade.size;
            current_value += trade.current * trade.size;
        }

        let cum_pl_dollar = current_value - entry_value;
        Self {
            count,
            total_equity: entry_value,
            cum_pl_dollar,
            cum_pl_percent: percent_of(cum_pl_dollar, entry_value).unwrap_or(0.0),
            liquid_value: entry_value + cum_pl_dollar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClosedSummary {
    pub count: usize,
    pub total_net_profit: f64,
    pub total_fees: f64,
    pub avg_profit_per_trade: f64,
    /// Trades with unknown dates count as zero days but stay in the divisor.
    pub avg_duration_days: f64,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub largest_profit: f64,
    pub largest_loss: f64,
}

impl ClosedSummary {
    pub fn of<'a>(trades: impl IntoIterator<Item = &'a ClosedTrade>) -> Self {
        let mut count = 0usize;
        let mut total_net_profit = 0.0;
        let mut total_fees = 0.0;
        let mut total_days = 0i64;
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut largest_profit: Option<f64> = None;
        let mut largest_loss: Option<f64> = None;

        for trade in trades {
            let m = ClosedMetrics::of(trade);
            count += 1;
            total_net_profit += m.net_profit;
            total_fees += m.fee;
            total_days += m.duration_days.unwrap_or(0);

            // Break-even trades are neither wins nor losses.
            if m.net_profit > 0.0 {
                wins += 1;
            } else if m.net_profit < 0.0 {
                losses += 1;
            }

            largest_profit = Some(largest_profit.map_or(m.net_profit, |p| p.max(m.net_profit)));
            largest_loss = Some(largest_loss.map_or(m.net_profit, |l| l.min(m.net_profit)));
        }

        if count == 0 {
            return Self::default();
        }

        let n = count as f64;
        Self {
            count,
            total_net_profit,
            total_fees,
            avg_profit_per_trade: total_net_profit / n,
            avg_duration_days:    total_days as f64 / n,
            win_rate:             wins as f64 / n * 100.0,
            loss_rate:            losses as f64 / n * 100.0,
            largest_profit:       largest_profit.unwrap_or(0.0),
            largest_loss:         largest_loss.unwrap_or(0.0),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
