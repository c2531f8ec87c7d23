pub mod aggregator;
pub mod daily_series;
pub mod error;
