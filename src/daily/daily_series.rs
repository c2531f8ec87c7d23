//! Calendar-day outputs and the run-edge truncation applied to them.

use crate::statistics::nan_mean;
use crate::types::variable::DailyRole;
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis};

/// One reduced value per calendar day (UTC).
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
    /// Set when the last day may be built from an incomplete interval and no
    /// truncation rule was available to remove it.
    pub boundary_provisional: bool,
}

impl DailySeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        Self {
            dates,
            values,
            boundary_provisional: false,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .iter()
            .position(|d| *d == date)
            .and_then(|i| self.values.get(i).copied().flatten())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    pub fn with_edge_truncation(mut self, truncation: EdgeTruncation, role: DailyRole) -> Self {
        let drop = truncation.days_to_drop(role);
        let keep = self.dates.len().saturating_sub(drop);
        self.dates.truncate(keep);
        self.values.truncate(keep);
        self.boundary_provisional |= truncation.marks_provisional(role);
        self
    }
}

/// Member × calendar-day values for one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMatrix {
    pub dates: Vec<NaiveDate>,
    pub values: Array2<Option<f64>>,
    pub boundary_provisional: bool,
}

impl DailyMatrix {
    /// Builds a matrix from one row of daily values per member.
    ///
    /// Returns `None` when a row's length differs from the number of dates.
    pub fn from_member_rows(dates: Vec<NaiveDate>, rows: Vec<Vec<Option<f64>>>) -> Option<Self> {
        let members = rows.len();
        let days = dates.len();
        if rows.iter().any(|row| row.len() != days) {
            return None;
        }
        let flat: Vec<Option<f64>> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((members, days), flat)
            .ok()
            .map(|values| Self {
                dates,
                values,
                boundary_provisional: false,
            })
    }

    pub fn members(&self) -> usize {
        self.values.nrows()
    }

    pub fn days(&self) -> usize {
        self.values.ncols()
    }

    pub fn member_series(&self, member: usize) -> DailySeries {
        DailySeries {
            dates: self.dates.clone(),
            values: self.values.row(member).to_vec(),
            boundary_provisional: self.boundary_provisional,
        }
    }

    pub fn day_column(&self, day: usize) -> ArrayView1<'_, Option<f64>> {
        self.values.column(day)
    }

    /// Per day, the mean of the member daily values that are present.
    ///
    /// Each member is reduced to its own daily value first, so a member with a
    /// MISSING step still counts with the steps it has.
    pub fn mean_across_members(&self) -> DailySeries {
        DailySeries {
            dates: self.dates.clone(),
            values: self
                .values
                .axis_iter(Axis(1))
                .map(|day| nan_mean(day.iter()))
                .collect(),
            boundary_provisional: self.boundary_provisional,
        }
    }

    /// Per day, the number of members whose value exceeds `threshold`, divided
    /// by the configured ensemble size. A day with no member values is MISSING.
    pub fn fraction_exceeding(&self, threshold: f64, ensemble_size: usize) -> DailySeries {
        let values = self
            .values
            .axis_iter(Axis(1))
            .map(|day| {
                if ensemble_size == 0 || day.iter().all(Option::is_none) {
                    return None;
                }
                let hits = day.iter().flatten().filter(|v| **v > threshold).count();
                Some(hits as f64 / ensemble_size as f64)
            })
            .collect();
        DailySeries {
            dates: self.dates.clone(),
            values,
            boundary_provisional: self.boundary_provisional,
        }
    }

    pub fn with_edge_truncation(mut self, truncation: EdgeTruncation, role: DailyRole) -> Self {
        let drop = truncation.days_to_drop(role);
        if drop > 0 {
            let keep = self.dates.len().saturating_sub(drop);
            self.dates.truncate(keep);
            self.values = self
                .values
                .slice(ndarray::s![.., ..keep])
                .to_owned();
        }
        self.boundary_provisional |= truncation.marks_provisional(role);
        self
    }
}

/// How the last calendar days of a run are trimmed, decided by its init hour.
///
/// Interval maxima and minima are reported at the end of each 6 h step, so the
/// final days of a run only see part of the diurnal cycle. A 00Z run loses its
/// last two lows, a 12Z run its last two highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTruncation {
    DropLastLows(usize),
    DropLastHighs(usize),
    /// No rule for this init hour; high and low keep every day but the last
    /// one is flagged provisional.
    Provisional,
}

impl EdgeTruncation {
    pub const BOUNDARY_DAYS: usize = 2;

    pub fn for_init_hour(hour: u32) -> Self {
        match hour {
            0 => EdgeTruncation::DropLastLows(Self::BOUNDARY_DAYS),
            12 => EdgeTruncation::DropLastHighs(Self::BOUNDARY_DAYS),
            _ => EdgeTruncation::Provisional,
        }
    }

    pub fn days_to_drop(&self, role: DailyRole) -> usize {
        match (self, role) {
            (EdgeTruncation::DropLastLows(n), DailyRole::Low) => *n,
            (EdgeTruncation::DropLastHighs(n), DailyRole::High) => *n,
            _ => 0,
        }
    }

    pub fn marks_provisional(&self, role: DailyRole) -> bool {
        matches!(self, EdgeTruncation::Provisional)
            && matches!(role, DailyRole::High | DailyRole::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2017, 4, d).unwrap())
            .collect()
    }

    #[test]
    fn test_truncation_rule_by_init_hour() {
        let at_00 = EdgeTruncation::for_init_hour(0);
        assert_eq!(at_00.days_to_drop(DailyRole::Low), 2);
        assert_eq!(at_00.days_to_drop(DailyRole::High), 0);

        let at_12 = EdgeTruncation::for_init_hour(12);
        assert_eq!(at_12.days_to_drop(DailyRole::High), 2);
        assert_eq!(at_12.days_to_drop(DailyRole::Low), 0);

        for hour in [6, 18] {
            let rule = EdgeTruncation::for_init_hour(hour);
            assert_eq!(rule, EdgeTruncation::Provisional);
            assert_eq!(rule.days_to_drop(DailyRole::High), 0);
            assert!(rule.marks_provisional(DailyRole::Low));
            assert!(!rule.marks_provisional(DailyRole::Other));
        }
    }

    #[test]
    fn test_series_truncation_drops_last_dates() {
        let series = DailySeries::new(dates(5), vec![Some(1.0); 5]);
        let low = series
            .clone()
            .with_edge_truncation(EdgeTruncation::for_init_hour(0), DailyRole::Low);
        assert_eq!(low.dates, dates(3));
        assert_eq!(low.values.len(), 3);
        assert!(!low.boundary_provisional);

        let dew = series.with_edge_truncation(EdgeTruncation::for_init_hour(0), DailyRole::Other);
        assert_eq!(dew.len(), 5);
    }

    #[test]
    fn test_provisional_series_keeps_every_day() {
        let high = DailySeries::new(dates(4), vec![Some(80.0); 4])
            .with_edge_truncation(EdgeTruncation::for_init_hour(18), DailyRole::High);
        assert_eq!(high.len(), 4);
        assert!(high.boundary_provisional);
    }

    #[test]
    fn test_matrix_truncation_and_precip_fraction() {
        let rows = vec![
            vec![Some(0.1), Some(0.0), None, Some(0.0)],
            vec![Some(0.0), Some(0.2), None, Some(0.0)],
            vec![Some(0.3), None, None, Some(0.0)],
        ];
        let matrix = DailyMatrix::from_member_rows(dates(4), rows).unwrap();
        let fraction = matrix.fraction_exceeding(0.0, 3);
        assert_eq!(fraction.values[0], Some(2.0 / 3.0));
        assert_eq!(fraction.values[1], Some(1.0 / 3.0));
        assert_eq!(fraction.values[2], None);
        assert_eq!(fraction.values[3], Some(0.0));

        let high = matrix.with_edge_truncation(EdgeTruncation::DropLastHighs(2), DailyRole::High);
        assert_eq!(high.days(), 2);
        assert_eq!(high.members(), 3);
        assert_eq!(high.dates, dates(2));
        assert_eq!(high.member_series(2).values, vec![Some(0.3), None]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        assert!(DailyMatrix::from_member_rows(dates(2), vec![vec![None]]).is_none());
    }

    #[test]
    fn test_member_mean_skips_missing_members() {
        let rows = vec![
            vec![Some(4.0), Some(1.0), None],
            vec![Some(0.0), None, None],
            vec![Some(2.0), Some(3.0), None],
        ];
        let matrix = DailyMatrix::from_member_rows(dates(3), rows).unwrap();
        let mean = matrix.mean_across_members();
        assert_eq!(mean.dates, dates(3));
        assert_eq!(mean.values, vec![Some(2.0), Some(2.0), None]);
    }

    #[test]
    fn test_get_tolerates_short_values() {
        let series = DailySeries {
            dates: dates(3),
            values: vec![Some(1.0)],
            boundary_provisional: false,
        };
        assert_eq!(series.get(dates(1)[0]), Some(1.0));
        assert_eq!(series.get(dates(3)[2]), None);
        assert_eq!(series.get(NaiveDate::from_ymd_opt(2017, 5, 1).unwrap()), None);
    }
}
