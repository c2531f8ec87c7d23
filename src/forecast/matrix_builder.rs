//! Fills the per-variable ensemble matrices one forecast file at a time.

use crate::config::error::ConfigError;
use crate::config::run_config::RunConfig;
use crate::forecast::classifier::{ForecastFile, ForecastFileClassifier};
use crate::forecast::error::{FieldSourceError, IngestError};
use crate::forecast::field_source::{FieldSource, FieldSourceOpener};
use crate::forecast::field_table::{self, FieldRecipe, LeadRegime};
use crate::grid::locate_point::{GridField, GridIndex, GridPointLocator};
use crate::quality;
use crate::types::ensemble_matrix::{CellIndex, VariableMatrices};
use crate::types::location::TargetPoint;
use crate::types::run_time::RunInitTime;
use crate::types::variable::Variable;
use crate::units;
use log::{debug, info, warn};
use std::collections::HashMap;

/// What happened to a file handed to [`EnsembleMatrixBuilder::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// The cell now holds values read from the file.
    Filled(CellIndex),
    /// The file could not be used; every variable at the cell is MISSING.
    Missing(CellIndex),
    /// The file name did not identify a cell; nothing was written.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestIssue {
    pub file: String,
    pub cell: Option<CellIndex>,
    pub error: IngestError,
}

/// Tally of a run's ingestion, including every non-fatal problem encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub filled: usize,
    pub missing: usize,
    pub skipped: usize,
    pub issues: Vec<IngestIssue>,
}

impl IngestReport {
    fn record(&mut self, file: &ForecastFile, cell: Option<CellIndex>, error: IngestError) {
        self.issues.push(IngestIssue {
            file: file.identifier.clone(),
            cell,
            error,
        });
    }

    pub fn files_seen(&self) -> usize {
        self.filled + self.missing + self.skipped
    }
}

struct CellReading {
    values: Vec<(Variable, Option<f64>)>,
    notes: Vec<IngestError>,
}

/// Owns the ensemble matrices while forecast files are being ingested.
pub struct EnsembleMatrixBuilder {
    classifier: ForecastFileClassifier,
    locator: GridPointLocator,
    matrices: VariableMatrices,
    init_time: Option<RunInitTime>,
    report: IngestReport,
}

impl EnsembleMatrixBuilder {
    /// Creates empty matrices for the configured ensemble.
    ///
    /// The target longitude is normalized here, once, for the whole run.
    /// Misconfiguration is rejected before any file is looked at.
    pub fn new(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            classifier: ForecastFileClassifier::new(config)?,
            locator: GridPointLocator::new(TargetPoint::new(config.target())),
            matrices: VariableMatrices::new(config.ensemble_size(), config.lead_time_count()),
            init_time: None,
            report: IngestReport::default(),
        })
    }

    /// Ingests one forecast file into the cell its name identifies.
    ///
    /// Problems with the file itself are recorded in the [`IngestReport`] and the
    /// cell is left MISSING; the file is only opened once it has passed
    /// classification and the size check. The only error returned is
    /// [`IngestError::PointNotOnGrid`], which makes the whole run meaningless.
    pub fn ingest<O: FieldSourceOpener>(
        &mut self,
        file: &ForecastFile,
        opener: &O,
    ) -> Result<CellOutcome, IngestError> {
        let cell = match self.classifier.classify(&file.identifier) {
            Ok(cell) => cell,
            Err(error) => {
                warn!("Skipping {}: {}", file.identifier, error);
                self.report.record(file, None, error);
                self.report.skipped += 1;
                return Ok(CellOutcome::Skipped);
            }
        };

        if self.classifier.is_likely_corrupt(file.size_bytes) {
            let error = IngestError::CorruptFile {
                file: file.identifier.clone(),
                size_bytes: file.size_bytes,
                threshold_bytes: self.classifier.corrupt_threshold_bytes(),
            };
            return Ok(self.mark_missing(file, cell, error));
        }

        let source = match opener.open(file) {
            Ok(source) => source,
            Err(source) => {
                let error = IngestError::Open {
                    file: file.identifier.clone(),
                    source,
                };
                return Ok(self.mark_missing(file, cell, error));
            }
        };

        match self.read_cell(file, cell, &source) {
            Ok(reading) => {
                for (variable, value) in reading.values {
                    self.matrices.set(variable, cell, value);
                }
                for note in reading.notes {
                    warn!("{}", note);
                    self.report.record(file, Some(cell), note);
                }
                self.capture_init_time(file, cell, &source);
                self.report.filled += 1;
                Ok(CellOutcome::Filled(cell))
            }
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => Ok(self.mark_missing(file, cell, error)),
        }
    }

    pub fn matrices(&self) -> &VariableMatrices {
        &self.matrices
    }

    pub fn init_time(&self) -> Option<RunInitTime> {
        self.init_time
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn into_parts(self) -> (VariableMatrices, Option<RunInitTime>, IngestReport) {
        (self.matrices, self.init_time, self.report)
    }

    fn mark_missing(
        &mut self,
        file: &ForecastFile,
        cell: CellIndex,
        error: IngestError,
    ) -> CellOutcome {
        warn!("{}; member {} lead {} set to missing", error, cell.member + 1, cell.lead_time);
        self.matrices.clear_cell(cell);
        self.report.record(file, Some(cell), error);
        self.report.missing += 1;
        CellOutcome::Missing(cell)
    }

    fn read_cell<S: FieldSource>(
        &self,
        file: &ForecastFile,
        cell: CellIndex,
        source: &S,
    ) -> Result<CellReading, IngestError> {
        let regime = LeadRegime::for_lead_time(cell.lead_time);
        let fields = load_fields(file, regime, source)?;

        let reference_name = regime.grid_reference_field();
        let reference = fields
            .get(reference_name)
            .ok_or_else(|| IngestError::MissingField {
                file: file.identifier.clone(),
                field: reference_name.to_string(),
            })?;
        let index = self
            .locator
            .locate(&reference.grid)
            .map_err(|source| IngestError::PointNotOnGrid {
                file: file.identifier.clone(),
                source,
            })?;

        let expected = reference.grid.shape();
        for (name, field) in &fields {
            if field.values.dim() != expected {
                return Err(IngestError::FieldShape {
                    file: file.identifier.clone(),
                    field: name.to_string(),
                    expected,
                    found: field.values.dim(),
                });
            }
        }

        let point = |name: &'static str| -> Result<f64, IngestError> {
            fields
                .get(name)
                .and_then(|field| field.value_at(index))
                .ok_or_else(|| IngestError::MissingField {
                    file: file.identifier.clone(),
                    field: name.to_string(),
                })
        };

        let mut values = Vec::with_capacity(Variable::ALL.len());
        let mut notes = Vec::new();
        for variable in Variable::ALL {
            let value = match field_table::recipe(variable, regime) {
                FieldRecipe::Zero => Some(0.0),
                FieldRecipe::Direct(name) => {
                    quality::accept(variable, convert_point(variable, point(name)?))
                }
                FieldRecipe::Dewpoint {
                    temperature,
                    humidity,
                } => {
                    let temperature_c = units::kelvin_to_celsius(point(temperature)?);
                    let relative_humidity = point(humidity)?;
                    let dewpoint = units::dewpoint_fahrenheit(relative_humidity, temperature_c);
                    if dewpoint.is_nan() {
                        notes.push(IngestError::DewpointDomain {
                            file: file.identifier.clone(),
                            relative_humidity,
                            temperature: temperature_c,
                        });
                        None
                    } else {
                        quality::accept(variable, dewpoint)
                    }
                }
            };
            if value.is_none() {
                debug!(
                    "{} at member {} lead {} rejected from {}",
                    variable,
                    cell.member + 1,
                    cell.lead_time,
                    file.identifier
                );
            }
            values.push((variable, value));
        }

        log_index(file, index);
        Ok(CellReading { values, notes })
    }

    fn capture_init_time<S: FieldSource>(&mut self, file: &ForecastFile, cell: CellIndex, source: &S) {
        let init_time = match source.run_metadata() {
            Ok(metadata) => RunInitTime::from_metadata(metadata).ok_or_else(|| {
                FieldSourceError::Metadata(format!("hour {} is not an hour of day", metadata.hour))
            }),
            Err(e) => Err(e),
        };
        match init_time {
            Ok(time) => match self.init_time {
                None => {
                    info!("Run initialized at {} (from {})", time, file.identifier);
                    self.init_time = Some(time);
                }
                Some(existing) if existing != time => {
                    warn!(
                        "{} reports init time {} but the run was initialized at {}; keeping the first",
                        file.identifier, time, existing
                    );
                }
                Some(_) => {}
            },
            Err(source) => {
                let error = IngestError::Metadata {
                    file: file.identifier.clone(),
                    source,
                };
                warn!("{}", error);
                self.report.record(file, Some(cell), error);
            }
        }
    }
}

fn load_fields<S: FieldSource>(
    file: &ForecastFile,
    regime: LeadRegime,
    source: &S,
) -> Result<HashMap<&'static str, GridField>, IngestError> {
    let mut fields = HashMap::new();
    for name in field_table::required_fields(regime) {
        let field = source.select_field(name).map_err(|e| match e {
            FieldSourceError::FieldNotFound(_) => IngestError::MissingField {
                file: file.identifier.clone(),
                field: name.to_string(),
            },
            other => IngestError::Open {
                file: file.identifier.clone(),
                source: other,
            },
        })?;
        fields.insert(name, field);
    }
    Ok(fields)
}

fn convert_point(variable: Variable, raw: f64) -> f64 {
    match variable {
        Variable::MaxTemperature | Variable::MinTemperature => units::kelvin_to_fahrenheit(raw),
        Variable::Precipitation => units::mm_to_inches(raw),
        _ => raw,
    }
}

fn log_index(file: &ForecastFile, index: GridIndex) {
    debug!(
        "{}: target at grid row {} col {}",
        file.identifier, index.row, index.col
    );
}
