//! Rolls 6-hourly lead-time values up into calendar days (UTC).

use crate::daily::daily_series::{DailyMatrix, DailySeries};
use crate::daily::error::DailyAggregateError;
use crate::types::ensemble_matrix::EnsembleMatrix;
use crate::types::variable::DailyReducer;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use polars::prelude::*;

const VALID_TIME: &str = "ValidTime";
const DATE: &str = "date";

/// Groups values by the calendar date of their valid time.
///
/// Grouping runs on a polars `LazyFrame`. MISSING values are nulls and are
/// ignored by every reducer; a day whose values are all MISSING reduces to
/// MISSING, including under [`DailyReducer::Sum`].
#[derive(Debug, Clone)]
pub struct DailyAggregator {
    valid_times: Vec<DateTime<Utc>>,
}

impl DailyAggregator {
    pub fn new(valid_times: &[DateTime<Utc>]) -> Self {
        Self {
            valid_times: valid_times.to_vec(),
        }
    }

    /// Reduces one lead-time series to one value per day.
    ///
    /// # Arguments
    ///
    /// * `series` - One value per valid time, in lead-time order.
    /// * `reducer` - How the values inside a day are combined.
    ///
    /// # Errors
    ///
    /// Returns [`DailyAggregateError::LengthMismatch`] when `series` does not
    /// have one value per valid time, or [`DailyAggregateError::Polars`] if the
    /// grouping itself fails.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use gefs_point::{DailyAggregator, DailyReducer};
    ///
    /// let init = Utc.with_ymd_and_hms(2017, 4, 12, 12, 0, 0).unwrap();
    /// let times: Vec<_> = (0..4).map(|i| init + chrono::Duration::hours(6 * i)).collect();
    /// let aggregator = DailyAggregator::new(&times);
    ///
    /// let precip = [Some(0.0), Some(0.1), Some(0.2), None];
    /// let daily = aggregator.aggregate_series(&precip, DailyReducer::Sum)?;
    ///
    /// assert_eq!(daily.len(), 2);
    /// assert!((daily.values[0].unwrap() - 0.1).abs() < 1e-12);
    /// assert!((daily.values[1].unwrap() - 0.2).abs() < 1e-12);
    /// # Ok::<(), gefs_point::DailyAggregateError>(())
    /// ```
    pub fn aggregate_series(
        &self,
        series: &[Option<f64>],
        reducer: DailyReducer,
    ) -> Result<DailySeries, DailyAggregateError> {
        let (dates, mut rows) = self.aggregate_rows(&[series.to_vec()], reducer)?;
        let values = rows.pop().unwrap_or_else(|| vec![None; dates.len()]);
        Ok(DailySeries::new(dates, values))
    }

    /// Reduces every member of a matrix to one value per day.
    pub fn aggregate_matrix(
        &self,
        matrix: &EnsembleMatrix,
        reducer: DailyReducer,
    ) -> Result<DailyMatrix, DailyAggregateError> {
        let members: Vec<Vec<Option<f64>>> = (0..matrix.members())
            .map(|m| matrix.member_series(m))
            .collect();
        let (dates, rows) = self.aggregate_rows(&members, reducer)?;
        let days = dates.len();
        DailyMatrix::from_member_rows(dates, rows).ok_or(DailyAggregateError::LengthMismatch {
            expected: days,
            found: 0,
        })
    }

    fn aggregate_rows(
        &self,
        rows: &[Vec<Option<f64>>],
        reducer: DailyReducer,
    ) -> Result<(Vec<NaiveDate>, Vec<Vec<Option<f64>>>), DailyAggregateError> {
        let expected = self.valid_times.len();
        if let Some(row) = rows.iter().find(|row| row.len() != expected) {
            return Err(DailyAggregateError::LengthMismatch {
                expected,
                found: row.len(),
            });
        }

        let value_names: Vec<String> = (0..rows.len()).map(|i| format!("m{}", i)).collect();
        let count_names: Vec<String> = value_names.iter().map(|n| format!("{}_n", n)).collect();

        let millis: Vec<i64> = self
            .valid_times
            .iter()
            .map(|t| t.timestamp_millis())
            .collect();
        let mut columns: Vec<Column> = vec![Series::new(VALID_TIME.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .into()];
        for (name, row) in value_names.iter().zip(rows) {
            columns.push(Series::new(name.as_str().into(), row).into());
        }
        let frame = DataFrame::new(columns)?;

        let mut aggregations = Vec::with_capacity(rows.len() * 2);
        for (name, count) in value_names.iter().zip(&count_names) {
            aggregations.push(reduce(col(name.as_str()), reducer).alias(name.as_str()));
            aggregations.push(
                col(name.as_str())
                    .count()
                    .cast(DataType::UInt32)
                    .alias(count.as_str()),
            );
        }

        let daily = frame
            .lazy()
            .group_by([col(VALID_TIME).dt().date().alias(DATE)])
            .agg(aggregations)
            .sort([DATE], SortMultipleOptions::default())
            .collect()?;

        let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
        let date_series = daily.column(DATE)?.date()?;
        let dates = (0..daily.height())
            .filter_map(|i| date_series.get(i))
            .map(|days| {
                epoch
                    .checked_add_signed(TimeDelta::days(i64::from(days)))
                    .ok_or(DailyAggregateError::DateOutOfRange(days))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut reduced = Vec::with_capacity(rows.len());
        for (name, count) in value_names.iter().zip(&count_names) {
            let values = daily.column(name.as_str())?.f64()?;
            let counts = daily.column(count.as_str())?.u32()?;
            let row = values
                .into_iter()
                .zip(counts)
                .map(|(value, n)| match n {
                    Some(n) if n > 0 => value,
                    _ => None,
                })
                .collect();
            reduced.push(row);
        }

        Ok((dates, reduced))
    }
}

fn reduce(expr: Expr, reducer: DailyReducer) -> Expr {
    match reducer {
        DailyReducer::Max => expr.max(),
        DailyReducer::Min => expr.min(),
        DailyReducer::Mean => expr.mean(),
        DailyReducer::Sum => expr.sum(),
    }
}
