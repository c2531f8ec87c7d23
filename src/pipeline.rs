//! Entry point: turns a set of forecast files into an [`EnsembleRun`].

use crate::config::run_config::RunConfig;
use crate::daily::aggregator::DailyAggregator;
use crate::daily::daily_series::{DailyMatrix, DailySeries, EdgeTruncation};
use crate::daily::error::DailyAggregateError;
use crate::error::PipelineError;
use crate::export::error::ExportError;
use crate::export::member_table::{member_table_frame, write_member_table};
use crate::forecast::classifier::ForecastFile;
use crate::forecast::field_source::FieldSourceOpener;
use crate::forecast::matrix_builder::{EnsembleMatrixBuilder, IngestReport};
use crate::statistics;
use crate::types::ensemble_matrix::{EnsembleMatrix, VariableMatrices};
use crate::types::location::TargetPoint;
use crate::types::run_time::RunInitTime;
use crate::types::variable::Variable;
use crate::utils::{ensure_dir_exists, scan_forecast_directory};
use chrono::{DateTime, Utc};
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Runs the extraction pipeline for one configured target point.
///
/// # Example
///
/// ```
/// use gefs_point::{
///     EnsemblePipeline, FieldSourceError, ForecastFile, Grid, InMemoryFieldSource, LatLon,
///     RunConfig, RunMetadata, Variable,
/// };
/// use chrono::NaiveDate;
///
/// let config = RunConfig::builder()
///     .target(LatLon(32.9, -97.0))
///     .ensemble_size(1)
///     .lead_time_count(1)
///     .build();
/// let pipeline = EnsemblePipeline::new(config)?;
///
/// let grid = Grid::regular(40.0, -1.0, 10, 255.0, 1.0, 15);
/// let metadata = RunMetadata::new(NaiveDate::from_ymd_opt(2017, 4, 12).unwrap(), 0);
/// let opener = |_: &ForecastFile| {
///     Ok::<_, FieldSourceError>(
///         InMemoryFieldSource::new(grid.clone(), metadata)
///             .with_uniform_field("2 metre temperature", 300.0)
///             .with_uniform_field("2 metre relative humidity", 60.0),
///     )
/// };
///
/// let files = vec![ForecastFile::new("gep.t00z.pgrb2a_000_01", 80_000)];
/// let run = pipeline.run(files, &opener)?;
///
/// let mean = run.ensemble_mean(Variable::MaxTemperature);
/// assert!((mean[0].unwrap() - 80.33).abs() < 0.01);
/// assert_eq!(run.init_time().label(), "04/12 0000 UTC");
/// # Ok::<(), gefs_point::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EnsemblePipeline {
    config: RunConfig,
}

impl EnsemblePipeline {
    /// Validates the configuration. Misconfiguration is fatal for the run.
    pub fn new(config: RunConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let target = TargetPoint::new(config.target());
        info!(
            "Tracking {} at grid point ({}, {}) for {} members x {} lead times",
            config.location_name(),
            target.latitude(),
            target.longitude(),
            config.ensemble_size(),
            config.lead_time_count()
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Ingests `files` in lexicographic identifier order and collects the run.
    ///
    /// Problems with individual files never abort the run: they leave their
    /// cell MISSING and are listed in [`EnsembleRun::report`].
    ///
    /// # Errors
    ///
    /// * [`PipelineError::Ingest`] when the target point is not on a file's grid.
    /// * [`PipelineError::NoRunMetadata`] when no file yielded an init time.
    pub fn run<O: FieldSourceOpener>(
        &self,
        files: impl IntoIterator<Item = ForecastFile>,
        opener: &O,
    ) -> Result<EnsembleRun, PipelineError> {
        let mut files: Vec<ForecastFile> = files.into_iter().collect();
        files.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        if let Some(limit) = self.config.max_files() {
            if files.len() > limit {
                info!("Limiting run to the first {} of {} files", limit, files.len());
                files.truncate(limit);
            }
        }

        let mut builder = EnsembleMatrixBuilder::new(&self.config)?;
        for file in &files {
            builder.ingest(file, opener)?;
        }
        let (matrices, init_time, report) = builder.into_parts();
        let init_time = init_time.ok_or(PipelineError::NoRunMetadata)?;

        if !report.issues.is_empty() {
            warn!(
                "{} problems while ingesting {} files",
                report.issues.len(),
                report.files_seen()
            );
        }
        info!(
            "Run {} ingested: {} filled, {} missing, {} skipped",
            init_time, report.filled, report.missing, report.skipped
        );

        let (count, step_hours) = (self.config.lead_time_count(), self.config.step_hours());
        let valid_times = init_time
            .valid_times(count, step_hours)
            .ok_or(PipelineError::ValidTimesOutOfRange { count, step_hours })?;
        Ok(EnsembleRun {
            config: self.config.clone(),
            init_time,
            valid_times,
            matrices,
            report,
        })
    }

    /// Runs over every regular file in `dir`.
    pub fn run_directory<O: FieldSourceOpener>(
        &self,
        dir: &Path,
        opener: &O,
    ) -> Result<EnsembleRun, PipelineError> {
        let files = scan_forecast_directory(dir)?;
        self.run(files, opener)
    }
}

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct EnsembleRun {
    config: RunConfig,
    init_time: RunInitTime,
    valid_times: Vec<DateTime<Utc>>,
    matrices: VariableMatrices,
    report: IngestReport,
}

impl EnsembleRun {
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn init_time(&self) -> RunInitTime {
        self.init_time
    }

    pub fn valid_times(&self) -> &[DateTime<Utc>] {
        &self.valid_times
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn matrix(&self, variable: Variable) -> &EnsembleMatrix {
        self.matrices.get(variable)
    }

    pub fn matrices(&self) -> &VariableMatrices {
        &self.matrices
    }

    /// NaN-aware mean across members at every lead time.
    pub fn ensemble_mean(&self, variable: Variable) -> Vec<Option<f64>> {
        statistics::mean_across_members(self.matrix(variable))
    }

    /// Share of the configured ensemble with the flag set at every lead time.
    pub fn member_fraction(&self, variable: Variable) -> Vec<Option<f64>> {
        statistics::fraction_flagged(self.matrix(variable), self.config.ensemble_size())
    }

    /// The mean for continuous variables, the member fraction for flags.
    pub fn ensemble_summary(&self, variable: Variable) -> Vec<Option<f64>> {
        if variable.is_categorical() {
            self.member_fraction(variable)
        } else {
            self.ensemble_mean(variable)
        }
    }

    /// Running total of the ensemble mean since initialization.
    pub fn accumulated_mean(&self, variable: Variable) -> Vec<Option<f64>> {
        statistics::cumulative_sum(&self.ensemble_mean(variable))
    }

    pub fn edge_truncation(&self) -> EdgeTruncation {
        EdgeTruncation::for_init_hour(self.init_time.hour())
    }

    /// Per-member calendar-day values, truncated at the run edge for high and low.
    pub fn daily(&self, variable: Variable) -> Result<DailyMatrix, DailyAggregateError> {
        let daily = DailyAggregator::new(&self.valid_times)
            .aggregate_matrix(self.matrix(variable), variable.daily_reducer())?;
        Ok(daily.with_edge_truncation(self.edge_truncation(), variable.daily_role()))
    }

    /// Calendar-day reduction of [`EnsembleRun::ensemble_summary`].
    pub fn daily_mean(&self, variable: Variable) -> Result<DailySeries, DailyAggregateError> {
        let daily = DailyAggregator::new(&self.valid_times)
            .aggregate_series(&self.ensemble_summary(variable), variable.daily_reducer())?;
        Ok(daily.with_edge_truncation(self.edge_truncation(), variable.daily_role()))
    }

    /// Per day, the mean over members of each member's own daily value.
    ///
    /// Unlike [`EnsembleRun::daily_mean`], which reduces the per-step ensemble
    /// mean, a member with a MISSING step contributes the total of the steps it has.
    pub fn daily_member_mean(
        &self,
        variable: Variable,
    ) -> Result<DailySeries, DailyAggregateError> {
        Ok(self.daily(variable)?.mean_across_members())
    }

    /// Per day, the share of the configured ensemble with measurable precipitation.
    pub fn daily_precipitation_fraction(&self) -> Result<DailySeries, DailyAggregateError> {
        Ok(self
            .daily(Variable::Precipitation)?
            .fraction_exceeding(0.0, self.config.ensemble_size()))
    }

    pub fn member_table(&self, variable: Variable) -> Result<DataFrame, ExportError> {
        member_table_frame(
            &self.valid_times,
            self.matrix(variable),
            self.config.member_column_prefix(),
        )
    }

    pub fn write_member_table(&self, variable: Variable, path: &Path) -> Result<(), ExportError> {
        write_member_table(
            path,
            &self.valid_times,
            self.matrix(variable),
            self.config.member_column_prefix(),
        )
    }

    /// Writes `<stem>.csv` for each continuous variable into `dir`.
    pub fn write_member_tables(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        ensure_dir_exists(dir)?;
        let mut written = Vec::with_capacity(Variable::CONTINUOUS.len());
        for variable in Variable::CONTINUOUS {
            let path = dir.join(format!("{}.csv", variable.table_stem()));
            self.write_member_table(variable, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}
