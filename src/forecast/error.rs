use crate::grid::error::LocateGridPointError;
use thiserror::Error;

/// Failures reported by a [`crate::FieldSource`] implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldSourceError {
    #[error("Field '{0}' not found in forecast message")]
    FieldNotFound(String),

    #[error("Failed to open forecast message '{file}': {message}")]
    Open { file: String, message: String },

    #[error("Failed to decode forecast message: {0}")]
    Decode(String),

    #[error("Run metadata unavailable: {0}")]
    Metadata(String),
}

/// Per-file ingestion failures.
///
/// All of these are local to one file except [`IngestError::PointNotOnGrid`],
/// which aborts the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("Malformed forecast file name '{file}': {reason}")]
    MalformedFileName { file: String, reason: String },

    #[error("Forecast file '{file}' is only {size_bytes} bytes (threshold {threshold_bytes}), treating as corrupt")]
    CorruptFile {
        file: String,
        size_bytes: u64,
        threshold_bytes: u64,
    },

    #[error("Required field '{field}' missing from forecast file '{file}'")]
    MissingField { file: String, field: String },

    #[error("Field '{field}' in '{file}' has shape {found:?}, expected {expected:?}")]
    FieldShape {
        file: String,
        field: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Dewpoint undefined for relative humidity {relative_humidity}% at {temperature}°C in '{file}'")]
    DewpointDomain {
        file: String,
        relative_humidity: f64,
        temperature: f64,
    },

    #[error("Failed to read forecast file '{file}'")]
    Open {
        file: String,
        #[source]
        source: FieldSourceError,
    },

    #[error("Failed to read run metadata from '{file}'")]
    Metadata {
        file: String,
        #[source]
        source: FieldSourceError,
    },

    #[error("Target point cannot be resolved on the grid of '{file}'")]
    PointNotOnGrid {
        file: String,
        #[source]
        source: LocateGridPointError,
    },
}

impl IngestError {
    /// Whether the error must abort the whole run rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::PointNotOnGrid { .. })
    }
}
