//! The seam between the pipeline and whatever decodes forecast messages.
//!
//! The pipeline never parses the binary message format itself. It asks a
//! [`FieldSourceOpener`] for a [`FieldSource`] per file and then pulls named 2-D
//! fields and the run metadata out of it.

use crate::forecast::classifier::ForecastFile;
use crate::forecast::error::FieldSourceError;
use crate::grid::locate_point::{Grid, GridField};
use crate::types::run_time::RunMetadata;
use ndarray::Array2;
use std::collections::HashMap;

/// A decoded forecast message that exposes fields by name.
pub trait FieldSource {
    /// Returns the named field and the grid it lives on.
    ///
    /// A field the message does not contain must be reported as
    /// [`FieldSourceError::FieldNotFound`].
    fn select_field(&self, name: &str) -> Result<GridField, FieldSourceError>;

    /// Reference date and hour of the run that produced the message.
    fn run_metadata(&self) -> Result<RunMetadata, FieldSourceError>;
}

/// Opens a [`FieldSource`] for a forecast file.
///
/// Any `Fn(&ForecastFile) -> Result<S, FieldSourceError>` closure is an opener.
pub trait FieldSourceOpener {
    type Source: FieldSource;

    fn open(&self, file: &ForecastFile) -> Result<Self::Source, FieldSourceError>;
}

impl<F, S> FieldSourceOpener for F
where
    F: Fn(&ForecastFile) -> Result<S, FieldSourceError>,
    S: FieldSource,
{
    type Source = S;

    fn open(&self, file: &ForecastFile) -> Result<S, FieldSourceError> {
        self(file)
    }
}

/// A forecast message held entirely in memory.
///
/// Used for tests, benchmarks and for wrapping fields decoded elsewhere.
#[derive(Debug, Clone)]
pub struct InMemoryFieldSource {
    grid: Grid,
    metadata: Option<RunMetadata>,
    fields: HashMap<String, Array2<f64>>,
}

impl InMemoryFieldSource {
    pub fn new(grid: Grid, metadata: RunMetadata) -> Self {
        Self {
            grid,
            metadata: Some(metadata),
            fields: HashMap::new(),
        }
    }

    /// A message whose metadata cannot be read.
    pub fn without_metadata(grid: Grid) -> Self {
        Self {
            grid,
            metadata: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, values: Array2<f64>) -> Self {
        self.fields.insert(name.into(), values);
        self
    }

    /// Adds a field holding the same value in every grid cell.
    pub fn with_uniform_field(self, name: impl Into<String>, value: f64) -> Self {
        let values = Array2::from_elem(self.grid.shape(), value);
        self.with_field(name, values)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl FieldSource for InMemoryFieldSource {
    fn select_field(&self, name: &str) -> Result<GridField, FieldSourceError> {
        self.fields
            .get(name)
            .map(|values| GridField::new(values.clone(), self.grid.clone()))
            .ok_or_else(|| FieldSourceError::FieldNotFound(name.to_string()))
    }

    fn run_metadata(&self) -> Result<RunMetadata, FieldSourceError> {
        self.metadata
            .ok_or_else(|| FieldSourceError::Metadata("no reference time in message".to_string()))
    }
}

/// In-memory messages keyed by file identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    sources: HashMap<String, InMemoryFieldSource>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, source: InMemoryFieldSource) {
        self.sources.insert(identifier.into(), source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FieldSourceOpener for InMemoryArchive {
    type Source = InMemoryFieldSource;

    fn open(&self, file: &ForecastFile) -> Result<InMemoryFieldSource, FieldSourceError> {
        self.sources
            .get(&file.identifier)
            .cloned()
            .ok_or_else(|| FieldSourceError::Open {
                file: file.identifier.clone(),
                message: "no such message in archive".to_string(),
            })
    }
}
