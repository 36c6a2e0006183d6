//! Domain models shared across the whole trade journal.

pub mod date;
pub mod input;
pub mod trade;

pub use input::{ClosedTradeInput, OpenTradeInput};
pub use trade::{normalize_ticker, ticker_base, ClosedTrade, OpenTrade};
