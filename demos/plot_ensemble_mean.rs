//! demos/plot_ensemble_mean.rs
//!
//! Builds a synthetic 20-member run in memory, reduces it to the ensemble-mean
//! daily high and low and plots both with `plotlars`.
//!
//! To run this demo:
//! cargo run --example plot_ensemble_mean --features examples

use std::error::Error;

use chrono::NaiveDate;
use gefs_point::{
    DailySeries, EnsemblePipeline, ForecastFile, Grid, InMemoryArchive, InMemoryFieldSource,
    LatLon, RunConfig, RunMetadata, Variable, CATEGORICAL_FREEZING_RAIN, CATEGORICAL_ICE_PELLETS,
    CATEGORICAL_RAIN, CATEGORICAL_SNOW, MAXIMUM_TEMPERATURE, MINIMUM_TEMPERATURE,
    RELATIVE_HUMIDITY_2M, TEMPERATURE_2M, TOTAL_PRECIPITATION,
};
use plotlars::{Axis, Legend, Line, Plot, Rgb, Shape, Text, TimeSeriesPlot};
use polars::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    let config = RunConfig::builder()
        .target(LatLon(32.896944, -97.038056))
        .location_name("Dallas/Fort Worth, TX")
        .build();
    let pipeline = EnsemblePipeline::new(config.clone())?;

    println!("Building synthetic ensemble...");
    let (archive, files) = synthetic_run(&config);
    let run = pipeline.run(files, &archive)?;

    let highs = run.daily_mean(Variable::MaxTemperature)?;
    let lows = run.daily_mean(Variable::MinTemperature)?;
    let frame = high_low_frame(&highs, &lows)?;
    println!("{}", frame);

    let title = format!(
        "{} GEFS mean high/low, init {}",
        run.config().location_name(),
        run.init_time().label()
    );
    plot_high_low(&frame, &title);
    println!("Plot shown in browser.");
    Ok(())
}

/// One row per day that has a high; lows are null on days the run edge removed.
fn high_low_frame(highs: &DailySeries, lows: &DailySeries) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = highs.dates.iter().map(|d| d.format("%m/%d").to_string()).collect();
    let low_values: Vec<Option<f64>> = highs.dates.iter().map(|d| lows.get(*d)).collect();
    DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("high".into(), highs.values.clone()).into(),
        Series::new("low".into(), low_values).into(),
    ])
}

fn synthetic_run(config: &RunConfig) -> (InMemoryArchive, Vec<ForecastFile>) {
    let grid = Grid::regular(45.0, -1.0, 20, 250.0, 1.0, 30);
    let metadata = RunMetadata::new(NaiveDate::from_ymd_opt(2017, 4, 12).unwrap(), 0);
    let mut archive = InMemoryArchive::new();
    let mut files = Vec::new();

    for member in 1..=config.ensemble_size() {
        for lead in 0..config.lead_time_count() {
            let hour = lead as u32 * config.step_hours();
            // diurnal cycle peaking at 00Z, slow warming trend, member spread
            let phase = (f64::from(hour % 24) / 24.0 * std::f64::consts::TAU).cos();
            let spread = (member as f64 - 10.5) * 0.15 * f64::from(hour) / 96.0;
            let base = 290.0 + 6.0 * phase + f64::from(hour) / 48.0 + spread;

            let mut source = InMemoryFieldSource::new(grid.clone(), metadata)
                .with_uniform_field(TEMPERATURE_2M, base)
                .with_uniform_field(RELATIVE_HUMIDITY_2M, 55.0 + 10.0 * phase);
            if hour > 0 {
                source = source
                    .with_uniform_field(MAXIMUM_TEMPERATURE, base + 1.5)
                    .with_uniform_field(MINIMUM_TEMPERATURE, base - 1.5)
                    .with_uniform_field(TOTAL_PRECIPITATION, 0.0)
                    .with_uniform_field(CATEGORICAL_SNOW, 0.0)
                    .with_uniform_field(CATEGORICAL_ICE_PELLETS, 0.0)
                    .with_uniform_field(CATEGORICAL_FREEZING_RAIN, 0.0)
                    .with_uniform_field(CATEGORICAL_RAIN, 0.0);
            }

            let name = format!("gep.t00z.pgrb2a_{:03}_{:02}", hour, member);
            archive.insert(name.clone(), source);
            files.push(ForecastFile::new(name, 500_000));
        }
    }
    (archive, files)
}

fn plot_high_low(data: &DataFrame, title: &str) {
    TimeSeriesPlot::builder()
        .data(data)
        .x("date")
        .y("high")
        .additional_series(vec!["low"])
        .size(8)
        .colors(vec![Rgb(235, 117, 0), Rgb(69, 157, 230)])
        .lines(vec![Line::Solid, Line::Dash])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Square])
        .plot_title(Text::from(title).font("Arial").size(18))
        .legend(&Legend::new().x(0.05).y(0.9))
        .x_title("date (UTC)")
        .y_title(Text::from("°F").color(Rgb(0, 0, 0)))
        .y_axis(
            &Axis::new()
                .value_color(Rgb(0, 0, 0))
                .show_grid(false)
                .zero_line_color(Rgb(0, 0, 0)),
        )
        .build()
        .plot();
}
