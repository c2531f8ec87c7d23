// Fixtures shared by the ingestion and pipeline tests.

use crate::config::run_config::RunConfig;
use crate::forecast::field_source::InMemoryFieldSource;
use crate::forecast::field_table::*;
use crate::grid::locate_point::Grid;
use crate::types::location::LatLon;
use crate::types::run_time::RunMetadata;
use chrono::NaiveDate;

/// Raw message values (Kelvin, percent, millimetres, flags) at every grid cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MessageValues {
    pub max_k: f64,
    pub min_k: f64,
    pub temp_k: f64,
    pub rh_pct: f64,
    pub precip_mm: f64,
    pub snow: f64,
    pub sleet: f64,
    pub fzra: f64,
    pub rain: f64,
}

impl Default for MessageValues {
    fn default() -> Self {
        Self {
            max_k: 300.0,
            min_k: 290.0,
            temp_k: 295.0,
            rh_pct: 50.0,
            precip_mm: 2.0,
            snow: 0.0,
            sleet: 0.0,
            fzra: 0.0,
            rain: 0.0,
        }
    }
}

/// Regional 1° grid that contains DFW (33N, 263E) at row 7, column 8.
pub(crate) fn regional_grid() -> Grid {
    Grid::regular(40.0, -1.0, 10, 255.0, 1.0, 15)
}

pub(crate) fn run_metadata(hour: u32) -> RunMetadata {
    RunMetadata::new(NaiveDate::from_ymd_opt(2017, 4, 12).unwrap(), hour)
}

pub(crate) fn dfw_config(members: usize, lead_times: usize) -> RunConfig {
    RunConfig::builder()
        .target(LatLon(32.896944, -97.038056))
        .location_name("Dallas/Fort Worth, TX")
        .ensemble_size(members)
        .lead_time_count(lead_times)
        .build()
}

pub(crate) fn file_name(hour: u32, member: usize) -> String {
    format!("gep.t00z.pgrb2a_{:03}_{:02}", hour, member)
}

/// Hour-0 message: instantaneous temperature and humidity only.
pub(crate) fn initial_message(values: MessageValues, metadata: RunMetadata) -> InMemoryFieldSource {
    InMemoryFieldSource::new(regional_grid(), metadata)
        .with_uniform_field(TEMPERATURE_2M, values.temp_k)
        .with_uniform_field(RELATIVE_HUMIDITY_2M, values.rh_pct)
}

pub(crate) fn forecast_message(values: MessageValues, metadata: RunMetadata) -> InMemoryFieldSource {
    forecast_message_on(regional_grid(), values, metadata)
}

pub(crate) fn forecast_message_on(
    grid: Grid,
    values: MessageValues,
    metadata: RunMetadata,
) -> InMemoryFieldSource {
    InMemoryFieldSource::new(grid, metadata)
        .with_uniform_field(MAXIMUM_TEMPERATURE, values.max_k)
        .with_uniform_field(MINIMUM_TEMPERATURE, values.min_k)
        .with_uniform_field(TEMPERATURE_2M, values.temp_k)
        .with_uniform_field(RELATIVE_HUMIDITY_2M, values.rh_pct)
        .with_uniform_field(TOTAL_PRECIPITATION, values.precip_mm)
        .with_uniform_field(CATEGORICAL_SNOW, values.snow)
        .with_uniform_field(CATEGORICAL_ICE_PELLETS, values.sleet)
        .with_uniform_field(CATEGORICAL_FREEZING_RAIN, values.fzra)
        .with_uniform_field(CATEGORICAL_RAIN, values.rain)
}
