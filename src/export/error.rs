use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create member table '{0}'")]
    Create(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Output path '{0}' exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Member table '{path}' could not be processed")]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to build member table")]
    Frame(#[from] PolarsError),

    #[error("Member table has {valid_times} valid times but the matrix has {lead_times} lead times")]
    ShapeMismatch { valid_times: usize, lead_times: usize },

    #[error("Member table '{path}' has no column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed to parse valid time '{value}'")]
    TimeParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
