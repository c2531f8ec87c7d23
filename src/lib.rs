mod config;
mod daily;
mod error;
mod export;
mod forecast;
mod grid;
mod pipeline;
mod quality;
mod types;
mod utils;

pub mod statistics;
pub mod units;

pub use error::PipelineError;
pub use pipeline::*;

pub use config::error::ConfigError;
pub use config::run_config::*;

pub use grid::error::LocateGridPointError;
pub use grid::locate_point::*;

pub use forecast::classifier::*;
pub use forecast::error::{FieldSourceError, IngestError};
pub use forecast::field_source::*;
pub use forecast::field_table::*;
pub use forecast::matrix_builder::*;

pub use quality::accept;

pub use types::ensemble_matrix::*;
pub use types::location::*;
pub use types::run_time::*;
pub use types::variable::*;

pub use daily::aggregator::DailyAggregator;
pub use daily::daily_series::*;
pub use daily::error::DailyAggregateError;

pub use export::error::ExportError;
pub use export::member_table::*;

pub use utils::{ensure_dir_exists, scan_forecast_directory};
