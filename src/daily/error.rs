use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DailyAggregateError {
    #[error("Series has {found} values but the run has {expected} valid times")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Daily grouping failed")]
    Polars(#[from] PolarsError),

    #[error("Day offset {0} from the epoch is not a representable date")]
    DateOutOfRange(i32),
}
