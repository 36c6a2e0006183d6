//! # engine::report
//!
//! Table views assembled from records: each row carries its raw record, its
//! derived metrics and the display strings, so clients never recompute or
//! reformat anything.

use serde::{Deserialize, Serialize};

use crate::engine::book::{Flash, LiveTrade};
use crate::engine::display;
use crate::engine::metrics::{ClosedMetrics, ClosedSummary, OpenMetrics, OpenSummary};
use crate::engine::sort::{sort_rows, ClosedColumn, OpenColumn, SortOrder};
use crate::models::{ClosedTrade, OpenTrade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortView<C> {
    pub column: C,
    pub order: SortOrder,
}

impl<C> From<(C, SortOrder)> for SortView<C> {
    fn from((column, order): (C, SortOrder)) -> Self {
        Self { column, order }
    }
}

// ─── Open board ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct OpenDisplay {
    pub ticker: String,
    pub entry: String,
    pub current: String,
    pub tp: String,
    pub sl: String,
    pub size: String,
    pub pl_percent: String,
    pub pl_dollar: String,
    pub distance_to_target: String,
    pub distance_to_stop: String,
    pub equity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenRow {
    #[serde(flatten)]
    pub trade: OpenTrade,
    pub quoted: bool,
    pub flash: Option<Flash>,
    pub metrics: OpenMetrics,
    pub display: OpenDisplay,
}

impl OpenRow {
    pub fn new(live: LiveTrade) -> Self {
        let metrics = OpenMetrics::of(&live.trade);
        let t = &live.trade;
        let display = OpenDisplay {
            ticker:             t.base_ticker().to_string(),
            entry:              display::price(t.entry),
            current:            display::price(t.current),
            tp:                 display::price(t.take_profit),
            sl:                 display::price(t.stop_loss),
            size:               display::price(t.size),
            pl_percent:         display::opt_percent(metrics.pl_percent),
            pl_dollar:          display::money(metrics.pl_dollar),
            distance_to_target: display::opt_percent(metrics.distance_to_target),
            distance_to_stop:   display::opt_percent(metrics.distance_to_stop),
            equity:             display::money(metrics.equity),
        };
        Self {
            trade: live.trade,
            quoted: live.quoted,
            flash: live.flash,
            metrics,
            display,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenSummaryDisplay {
    /// `"$12.00 | 4.00%"`
    pub live_pl: String,
    pub equity: String,
    pub liquid_value: String,
}

impl OpenSummaryDisplay {
    pub fn of(summary: &OpenSummary) -> Self {
        Self {
            live_pl:      format!(
                "{} | {}",
                display::money(summary.cum_pl_dollar),
                display::percent(summary.cum_pl_percent)
            ),
            equity:       display::money(summary.total_equity),
            liquid_value: display::money(summary.liquid_value),
        }
    }
}

/// The live open-trade table.
#[derive(Debug, Clone, Serialize)]
pub struct OpenBoard {
    pub rows: Vec<OpenRow>,
    pub summary: OpenSummary,
    pub summary_display: OpenSummaryDisplay,
    pub sort: Option<SortView<OpenColumn>>,
}

impl OpenBoard {
    /// `rows` arrive already in the book's sort order.
    pub fn new(rows: Vec<LiveTrade>, sort: Option<(OpenColumn, SortOrder)>) -> Self {
        let summary = OpenSummary::of(rows.iter().map(|r| &r.trade));
        Self {
            rows: rows.into_iter().map(OpenRow::new).collect(),
            summary_display: OpenSummaryDisplay::of(&summary),
            summary,
            sort: sort.map(SortView::from),
        }
    }
}

// ─── Closed report ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ClosedDisplay {
    pub ticker: String,
    pub entry: String,
    pub size: String,
    pub exit: String,
    pub gross_profit: String,
    pub fee: String,
    pub net_profit: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosedRow {
    #[serde(flatten)]
    pub trade: ClosedTrade,
    pub metrics: ClosedMetrics,
    pub display: ClosedDisplay,
}

impl ClosedRow {
    pub fn new(trade: ClosedTrade) -> Self {
        let metrics = ClosedMetrics::of(&trade);
        let display = ClosedDisplay {
            ticker:       trade.base_ticker().to_string(),
            entry:        display::price(trade.entry),
            size:         display::price(trade.size),
            exit:         display::price(trade.exit),
            gross_profit: display::money(metrics.gross_profit),
            fee:          display::money(metrics.fee),
            net_profit:   display::money(metrics.net_profit),
            duration:     display::opt_days(metrics.duration_days),
        };
        Self { trade, metrics, display }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosedSummaryDisplay {
    pub profit: String,
    pub profit_per_trade: String,
    /// `"2.5 days"`
    pub duration: String,
    pub wins: String,
    pub losses: String,
    pub largest_profit: String,
    pub largest_loss: String,
    pub fees: String,
}

impl ClosedSummaryDisplay {
    pub fn of(summary: &ClosedSummary) -> Self {
        Self {
            profit:           display::money(summary.total_net_profit),
            profit_per_trade: display::money(summary.avg_profit_per_trade),
            duration:         format!("{:.1} days", summary.avg_duration_days),
            wins:             display::percent(summary.win_rate),
            losses:           display::percent(summary.loss_rate),
            largest_profit:   display::money(summary.largest_profit),
            largest_loss:     display::money(summary.largest_loss),
            fees:             display::money(summary.total_fees),
        }
    }
}

/// Query of `GET /closed-trades/report`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportQuery {
    pub sort: Option<ClosedColumn>,
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub page: usize,
}

/// One page of the closed-trade table; the summary covers every trade.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedReport {
    pub rows: Vec<ClosedRow>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub sort: Option<SortView<ClosedColumn>>,
    pub summary: ClosedSummary,
    pub summary_display: ClosedSummaryDisplay,
}

impl ClosedReport {
    /// Sorts, then cuts out `query.page` (0-based). A page past the end is
    /// empty.
    pub fn build(mut trades: Vec<ClosedTrade>, query: ReportQuery, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let summary = ClosedSummary::of(&trades);

        let sort = query.sort.map(|column| (column, query.order.unwrap_or_default()));
        if let Some((column, order)) = sort {
            sort_rows(&mut trades, order, |t| column.key(t));
        }

        let total_count = trades.len();
        let total_pages = total_count.div_ceil(page_size);
        let rows = trades
            .into_iter()
            .skip(query.page.saturating_mul(page_size))
            .take(page_size)
            .map(ClosedRow::new)
            .collect();

        Self {
            rows,
            page: query.page,
            page_size,
            total_pages,
            total_count,
            sort: sort.map(SortView::from),
            summary_display: ClosedSummaryDisplay::of(&summary),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn closed(name: &str, entry: f64, exit: f64) -> ClosedTrade {
        ClosedTrade {
            ticker:      "ETHUSD".into(),
            entry,
            size:        1.0,
            exit,
            opened_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            closed_date: NaiveDate::from_ymd_opt(2025, 3, 4),
            filename:    name.into(),
        }
    }

    fn names(report: &ClosedReport) -> Vec<&str> {
        report.rows.iter().map(|r| r.trade.filename.as_str()).collect()
    }

    #[test]
    fn test_report_sorts_then_paginates() {
        let trades = vec![
            closed("a", 100.0, 110.0),
            closed("b", 100.0, 90.0),
            closed("c", 100.0, 130.0),
            closed("d", 100.0, 100.0),
            closed("e", 100.0, 50.0),
        ];
        let query = ReportQuery {
            sort:  Some(ClosedColumn::NetProfit),
            order: Some(SortOrder::Desc),
            page:  1,
        };
        let report = ClosedReport::build(trades, query, 2);

        assert_eq!(report.total_count, 5);
        assert_eq!(report.total_pages, 3);
        assert_eq!(names(&report), ["d", "b"]);
        assert_eq!(report.summary.count, 5);
        assert_eq!(report.sort, Some(SortView { column: ClosedColumn::NetProfit, order: SortOrder::Desc }));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let report = ClosedReport::build(
            vec![closed("a", 1.0, 2.0)],
            ReportQuery { page: 4, ..Default::default() },
            15,
        );
        assert!(report.rows.is_empty());
        assert_eq!(report.total_pages, 1);
        assert_eq!(report.summary.count, 1);
    }

    #[test]
    fn test_closed_row_display() {
        let row = ClosedRow::new(closed("a", 100.0, 120.0));
        assert_eq!(row.display.ticker, "ETH");
        assert_eq!(row.display.gross_profit, "$20.00");
        assert_eq!(row.display.fee, "$0.48");
        assert_eq!(row.display.net_profit, "$19.52");
        assert_eq!(row.display.duration, "3d");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["filename"], "a");
        assert_eq!(json["opened_date"], "03/01/25");
        assert_eq!(json["metrics"]["duration_days"], 3);
    }

    #[test]
    fn test_empty_report_summary_display() {
        let report = ClosedReport::build(Vec::new(), ReportQuery::default(), 15);
        assert_eq!(report.total_pages, 0);
        assert_eq!(report.summary_display.profit, "$0.00");
        assert_eq!(report.summary_display.duration, "0.0 days");
        assert_eq!(report.summary_display.wins, "0.00%");
    }

    #[test]
    fn test_open_board() {
        let trade = OpenTrade {
            ticker:      "BTCUSD".into(),
            entry:       100.0,
            take_profit: 130.0,
            stop_loss:   90.0,
            size:        2.0,
            current:     110.0,
            opened_date: None,
            filename:    "BTC_1.txt".into(),
        };
        let live = LiveTrade { trade, quoted: true, flash: Some(Flash::Up) };
        let board = OpenBoard::new(vec![live], Some((OpenColumn::Equity, SortOrder::Asc)));

        let row = &board.rows[0];
        assert_eq!(row.display.pl_percent, "10.00%");
        assert_eq!(row.display.pl_dollar, "$20.00");
        assert_eq!(row.display.equity, "$200.00");
        assert_eq!(board.summary_display.live_pl, "$20.00 | 10.00%");
        assert_eq!(board.summary_display.liquid_value, "$220.00");

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["rows"][0]["flash"], "up");
        assert_eq!(json["rows"][0]["tp"], 130.0);
        assert_eq!(json["sort"]["column"], "equity");
    }
}
