//! Run initialization time and the valid times derived from it.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use std::fmt;

/// Reference date and hour reported by a forecast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMetadata {
    pub date: NaiveDate,
    pub hour: u32,
}

impl RunMetadata {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// Builds metadata from the raw integer keys of a forecast message.
    ///
    /// `data_date` is `YYYYMMDD`; `data_time` is `HHMM` with leading zeros
    /// dropped, so `0` is 00 UTC, `600` is 06 UTC and `1200` is 12 UTC.
    pub fn from_message_keys(data_date: i64, data_time: i64) -> Option<Self> {
        if data_date < 0 || !(0..2400).contains(&data_time) {
            return None;
        }
        let date = NaiveDate::parse_from_str(&format!("{:08}", data_date), "%Y%m%d").ok()?;
        let hour = u32::try_from(data_time / 100).ok()?;
        Some(Self { date, hour })
    }
}

/// The UTC instant at which an ensemble run was initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunInitTime(DateTime<Utc>);

impl RunInitTime {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns `None` if the hour is not a valid hour of day.
    pub fn from_metadata(metadata: RunMetadata) -> Option<Self> {
        let time = NaiveTime::from_hms_opt(metadata.hour, 0, 0)?;
        Some(Self(Utc.from_utc_datetime(&metadata.date.and_time(time))))
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// `ValidTime(i) = init + i * step` for `i` in `0..count`.
    ///
    /// Returns `None` if any valid time falls outside chrono's representable range.
    pub fn valid_times(&self, count: usize, step_hours: u32) -> Option<Vec<DateTime<Utc>>> {
        (0..count)
            .map(|i| {
                let hours = i64::try_from(i).ok()?.checked_mul(i64::from(step_hours))?;
                self.0.checked_add_signed(TimeDelta::try_hours(hours)?)
            })
            .collect()
    }

    /// Short label used in plot titles, e.g. `"04/12 1200 UTC"`.
    pub fn label(&self) -> String {
        format!("{}00 UTC", self.0.format("%m/%d %H"))
    }
}

impl fmt::Display for RunInitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M UTC"))
    }
}
