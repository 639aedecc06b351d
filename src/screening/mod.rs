//! Cash-secured put screening for tickers the community is bullish on.

pub mod chains;
pub mod filters;
pub mod models;
pub mod pipeline;
pub mod report;
