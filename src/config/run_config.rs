//! The immutable configuration of one extraction run.

use crate::config::error::ConfigError;
use crate::types::location::LatLon;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LOCATION_NAME: &str = "Unnamed location";
pub const DEFAULT_ENSEMBLE_SIZE: usize = 20;
pub const DEFAULT_LEAD_TIME_COUNT: usize = 65;
pub const DEFAULT_STEP_HOURS: u32 = 6;
pub const DEFAULT_CORRUPT_THRESHOLD_BYTES: u64 = 40_000;
pub const DEFAULT_MEMBER_COLUMN_PREFIX: &str = "gep";

// Member numbers and lead hours are fixed-width fields in the file names.
const MAX_ENSEMBLE_SIZE: usize = 99;
const MAX_LEAD_HOUR: u64 = 999;

fn default_location_name() -> String {
    DEFAULT_LOCATION_NAME.to_string()
}
fn default_ensemble_size() -> usize {
    DEFAULT_ENSEMBLE_SIZE
}
fn default_lead_time_count() -> usize {
    DEFAULT_LEAD_TIME_COUNT
}
fn default_step_hours() -> u32 {
    DEFAULT_STEP_HOURS
}
fn default_corrupt_threshold_bytes() -> u64 {
    DEFAULT_CORRUPT_THRESHOLD_BYTES
}
fn default_member_column_prefix() -> String {
    DEFAULT_MEMBER_COLUMN_PREFIX.to_string()
}

/// Settings for a single ensemble extraction run.
///
/// Built either with the generated builder or from JSON. Only `target` is
/// required; everything else defaults to the reference deployment (a 20 member
/// ensemble with 65 six-hourly steps out to hour 384).
///
/// # Examples
///
/// ```
/// use gefs_point::{LatLon, RunConfig};
///
/// let config = RunConfig::builder()
///     .target(LatLon(32.896944, -97.038056))
///     .location_name("Dallas/Fort Worth, TX")
///     .build();
/// assert_eq!(config.ensemble_size(), 20);
/// assert_eq!(config.lead_time_count(), 65);
///
/// let from_json = RunConfig::from_json_str(
///     r#"{ "target": [32.896944, -97.038056], "ensemble_size": 10 }"#,
/// ).unwrap();
/// assert_eq!(from_json.ensemble_size(), 10);
/// assert_eq!(from_json.step_hours(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct RunConfig {
    target: LatLon,

    #[builder(into, default = default_location_name())]
    #[serde(default = "default_location_name")]
    location_name: String,

    #[builder(default = DEFAULT_ENSEMBLE_SIZE)]
    #[serde(default = "default_ensemble_size")]
    ensemble_size: usize,

    #[builder(default = DEFAULT_LEAD_TIME_COUNT)]
    #[serde(default = "default_lead_time_count")]
    lead_time_count: usize,

    #[builder(default = DEFAULT_STEP_HOURS)]
    #[serde(default = "default_step_hours")]
    step_hours: u32,

    #[builder(default = DEFAULT_CORRUPT_THRESHOLD_BYTES)]
    #[serde(default = "default_corrupt_threshold_bytes")]
    corrupt_threshold_bytes: u64,

    #[builder(into, default = default_member_column_prefix())]
    #[serde(default = "default_member_column_prefix")]
    member_column_prefix: String,

    /// Stop after this many files (in sorted order). Handy for quick test runs.
    #[serde(default)]
    max_files: Option<usize>,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_json_str(&text)
    }

    pub fn target(&self) -> LatLon {
        self.target
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn ensemble_size(&self) -> usize {
        self.ensemble_size
    }

    pub fn lead_time_count(&self) -> usize {
        self.lead_time_count
    }

    pub fn step_hours(&self) -> u32 {
        self.step_hours
    }

    pub fn corrupt_threshold_bytes(&self) -> u64 {
        self.corrupt_threshold_bytes
    }

    pub fn member_column_prefix(&self) -> &str {
        &self.member_column_prefix
    }

    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    /// Forecast hour of the last lead time.
    pub fn last_lead_hour(&self) -> u64 {
        (self.lead_time_count.saturating_sub(1) as u64) * u64::from(self.step_hours)
    }

    /// Checks the settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let LatLon(lat, lon) = self.target;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ConfigError::Invalid {
                field: "target",
                reason: format!("must be finite, got ({}, {})", lat, lon),
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Invalid {
                field: "target",
                reason: format!("latitude {} is outside [-90, 90]", lat),
            });
        }
        if self.ensemble_size == 0 || self.ensemble_size > MAX_ENSEMBLE_SIZE {
            return Err(ConfigError::Invalid {
                field: "ensemble_size",
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_ENSEMBLE_SIZE, self.ensemble_size
                ),
            });
        }
        if self.lead_time_count == 0 {
            return Err(ConfigError::Invalid {
                field: "lead_time_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.step_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "step_hours",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.last_lead_hour() > MAX_LEAD_HOUR {
            return Err(ConfigError::Invalid {
                field: "lead_time_count",
                reason: format!(
                    "last lead hour {} does not fit the three-digit hour field",
                    self.last_lead_hour()
                ),
            });
        }
        if self.member_column_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "member_column_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dfw() -> LatLon {
        LatLon(32.896944, -97.038056)
    }

    #[test]
    fn test_builder_defaults() {
        let config = RunConfig::builder().target(dfw()).build();
        assert_eq!(config.location_name(), DEFAULT_LOCATION_NAME);
        assert_eq!(config.ensemble_size(), 20);
        assert_eq!(config.lead_time_count(), 65);
        assert_eq!(config.step_hours(), 6);
        assert_eq!(config.corrupt_threshold_bytes(), 40_000);
        assert_eq!(config.member_column_prefix(), "gep");
        assert_eq!(config.max_files(), None);
        assert_eq!(config.last_lead_hour(), 384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_matches_builder() -> Result<(), Box<dyn std::error::Error>> {
        let from_json = RunConfig::from_json_str(
            r#"{ "target": [32.896944, -97.038056], "location_name": "DFW", "max_files": 80 }"#,
        )?;
        let built = RunConfig::builder()
            .target(dfw())
            .location_name("DFW")
            .max_files(80)
            .build();
        assert_eq!(from_json, built);
        Ok(())
    }

    #[test]
    fn test_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "target": [51.5, -0.12], "ensemble_size": 5 }}"#)?;
        let config = RunConfig::from_json_file(file.path())?;
        assert_eq!(config.ensemble_size(), 5);
        assert_eq!(config.target(), LatLon(51.5, -0.12));
        Ok(())
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RunConfig::from_json_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_, _)));
    }

    #[test]
    fn test_validate_rejects_misconfiguration() {
        let too_many = RunConfig::builder().target(dfw()).ensemble_size(100).build();
        assert!(matches!(
            too_many.validate(),
            Err(ConfigError::Invalid { field: "ensemble_size", .. })
        ));

        let no_steps = RunConfig::builder().target(dfw()).lead_time_count(0).build();
        assert!(no_steps.validate().is_err());

        let too_long = RunConfig::builder()
            .target(dfw())
            .lead_time_count(200)
            .build();
        assert!(matches!(
            too_long.validate(),
            Err(ConfigError::Invalid { field: "lead_time_count", .. })
        ));

        let bad_lat = RunConfig::builder().target(LatLon(91.0, 0.0)).build();
        assert!(bad_lat.validate().is_err());

        let nan = RunConfig::builder().target(LatLon(f64::NAN, 0.0)).build();
        assert!(nan.validate().is_err());
    }
}
