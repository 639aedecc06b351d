pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;
pub mod screening;
pub mod sentiment;
pub mod tickers;
