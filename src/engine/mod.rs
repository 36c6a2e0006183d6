//! # engine
//!
//! Everything between the store and the HTTP layer.
//!
//! | Module      | Role                                                    |
//! |-------------|---------------------------------------------------------|
//! | `lifecycle` | open → closed transition                                |
//! | `metrics`   | per-trade and aggregate derived values                  |
//! | `sort`      | stable column sorting and the session sort toggle       |
//! | `display`   | the one number-formatting policy                        |
//! | `book`      | in-memory open trades with live prices                  |
//! | `refresh`   | periodic price refresh of the book                      |
//! | `report`    | table views (rows + metrics + display + summary)        |

pub mod book;
pub mod display;
pub mod lifecycle;
pub mod metrics;
pub mod refresh;
pub mod report;
pub mod sort;

pub use book::LiveBook;
pub use refresh::PriceRefresher;
