use crate::config::error::ConfigError;
use crate::daily::error::DailyAggregateError;
use crate::export::error::ExportError;
use crate::forecast::error::IngestError;
use crate::grid::error::LocateGridPointError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    LocateGridPoint(#[from] LocateGridPointError),

    #[error(transparent)]
    DailyAggregate(#[from] DailyAggregateError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No forecast file yielded run metadata; valid times cannot be derived")]
    NoRunMetadata,

    #[error("Valid times for {count} lead times every {step_hours} h fall outside the supported calendar")]
    ValidTimesOutOfRange { count: usize, step_hours: u32 },

    #[error("Failed to scan forecast directory '{0}'")]
    DirectoryScan(PathBuf, #[source] std::io::Error),
}
