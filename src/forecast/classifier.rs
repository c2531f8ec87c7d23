//! Maps forecast file names onto ensemble matrix cells.
//!
//! File names end in a fixed-width `_HHH_MM` suffix: a three-digit forecast
//! hour followed by a two-digit, 1-based member number, e.g.
//! `gep.t00z.pgrb2a_048_07` is member 7 at hour 48.

use crate::config::error::ConfigError;
use crate::config::run_config::RunConfig;
use crate::forecast::error::IngestError;
use crate::types::ensemble_matrix::CellIndex;
use std::path::PathBuf;

const SUFFIX_LEN: usize = 7;

/// A forecast file as seen by the pipeline before it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastFile {
    /// File name used for classification and ordering.
    pub identifier: String,
    /// Location on disk, when the file came from a directory scan.
    pub path: Option<PathBuf>,
    pub size_bytes: u64,
}

impl ForecastFile {
    pub fn new(identifier: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            identifier: identifier.into(),
            path: None,
            size_bytes,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastFileClassifier {
    ensemble_size: usize,
    lead_time_count: usize,
    step_hours: u32,
    corrupt_threshold_bytes: u64,
}

impl ForecastFileClassifier {
    /// Fails when the configuration could not classify any file, e.g. a zero step.
    pub fn new(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ensemble_size: config.ensemble_size(),
            lead_time_count: config.lead_time_count(),
            step_hours: config.step_hours(),
            corrupt_threshold_bytes: config.corrupt_threshold_bytes(),
        })
    }

    /// Derives the zero-based (member, lead time) cell from a file name.
    pub fn classify(&self, identifier: &str) -> Result<CellIndex, IngestError> {
        let malformed = |reason: String| IngestError::MalformedFileName {
            file: identifier.to_string(),
            reason,
        };

        let suffix = identifier
            .len()
            .checked_sub(SUFFIX_LEN)
            .and_then(|start| identifier.get(start..))
            .ok_or_else(|| malformed("too short for the _HHH_MM suffix".to_string()))?
            .as_bytes();

        if suffix[0] != b'_' || suffix[4] != b'_' {
            return Err(malformed("expected a _HHH_MM suffix".to_string()));
        }
        let hour = parse_digits(&suffix[1..4])
            .ok_or_else(|| malformed("forecast hour is not three digits".to_string()))?;
        let member = parse_digits(&suffix[5..7])
            .ok_or_else(|| malformed("member number is not two digits".to_string()))?;

        if member == 0 || member > self.ensemble_size {
            return Err(malformed(format!(
                "member {} outside 1..={}",
                member, self.ensemble_size
            )));
        }
        let step = self.step_hours as usize;
        if hour % step != 0 {
            return Err(malformed(format!(
                "hour {} is not a multiple of the {} h step",
                hour, step
            )));
        }
        let lead_time = hour / step;
        if lead_time >= self.lead_time_count {
            return Err(malformed(format!(
                "hour {} is beyond the last lead time",
                hour
            )));
        }

        Ok(CellIndex::new(member - 1, lead_time))
    }

    /// Size heuristic for messages that failed to transmit or decode.
    pub fn is_likely_corrupt(&self, size_bytes: u64) -> bool {
        size_bytes < self.corrupt_threshold_bytes
    }

    pub fn corrupt_threshold_bytes(&self) -> u64 {
        self.corrupt_threshold_bytes
    }
}

fn parse_digits(bytes: &[u8]) -> Option<usize> {
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0usize, |acc, b| acc * 10 + usize::from(b - b'0')),
    )
}
