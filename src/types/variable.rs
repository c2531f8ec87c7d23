//! Defines the scalar quantities tracked for every ensemble member and lead time,
//! together with their quality-control bounds and daily reduction operators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a variable holds a physical measurement or a 0/1 occurrence flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Continuous,
    Categorical,
}

/// How a variable is collapsed from 6-hourly steps into one value per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyReducer {
    Max,
    Min,
    Mean,
    Sum,
}

impl fmt::Display for DailyReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DailyReducer::Max => "max",
            DailyReducer::Min => "min",
            DailyReducer::Mean => "mean",
            DailyReducer::Sum => "sum",
        };
        write!(f, "{}", name)
    }
}

/// Which end of the diurnal cycle a temperature variable describes.
///
/// Only the high and low series are subject to run-edge truncation when
/// aggregating to calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyRole {
    High,
    Low,
    Other,
}

/// A tracked forecast quantity at the target point.
///
/// Continuous variables are stored in US units after conversion (degrees
/// Fahrenheit, inches). Categorical variables hold the raw 0/1 precipitation
/// type flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Maximum 2 m temperature over the preceding interval (°F).
    MaxTemperature,
    /// Minimum 2 m temperature over the preceding interval (°F).
    MinTemperature,
    /// 2 m dewpoint derived from temperature and relative humidity (°F).
    Dewpoint,
    /// Precipitation amount over the preceding interval (inches).
    Precipitation,
    /// Categorical snow flag.
    CategoricalSnow,
    /// Categorical ice pellets (sleet) flag.
    CategoricalIcePellets,
    /// Categorical freezing rain flag.
    CategoricalFreezingRain,
    /// Categorical liquid rain flag.
    CategoricalRain,
}

impl Variable {
    /// Every tracked variable, in storage order.
    pub const ALL: [Variable; 8] = [
        Variable::MaxTemperature,
        Variable::MinTemperature,
        Variable::Dewpoint,
        Variable::Precipitation,
        Variable::CategoricalSnow,
        Variable::CategoricalIcePellets,
        Variable::CategoricalFreezingRain,
        Variable::CategoricalRain,
    ];

    /// The continuous variables, which are the ones exported as member tables.
    pub const CONTINUOUS: [Variable; 4] = [
        Variable::MaxTemperature,
        Variable::MinTemperature,
        Variable::Precipitation,
        Variable::Dewpoint,
    ];

    pub fn kind(&self) -> VariableKind {
        match self {
            Variable::MaxTemperature
            | Variable::MinTemperature
            | Variable::Dewpoint
            | Variable::Precipitation => VariableKind::Continuous,
            Variable::CategoricalSnow
            | Variable::CategoricalIcePellets
            | Variable::CategoricalFreezingRain
            | Variable::CategoricalRain => VariableKind::Categorical,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind() == VariableKind::Categorical
    }

    /// Open plausibility interval in the variable's stored unit, if it is range checked.
    ///
    /// Values on the bounds themselves are accepted.
    pub fn plausible_range(&self) -> Option<(f64, f64)> {
        match self {
            Variable::MaxTemperature | Variable::MinTemperature => Some((-100.0, 150.0)),
            Variable::Dewpoint => Some((-50.0, 100.0)),
            _ => None,
        }
    }

    pub fn daily_reducer(&self) -> DailyReducer {
        match self {
            Variable::MaxTemperature => DailyReducer::Max,
            Variable::MinTemperature => DailyReducer::Min,
            Variable::Dewpoint => DailyReducer::Mean,
            Variable::Precipitation => DailyReducer::Sum,
            // a flag that fires at any step marks the whole day
            _ => DailyReducer::Max,
        }
    }

    pub fn daily_role(&self) -> DailyRole {
        match self {
            Variable::MaxTemperature => DailyRole::High,
            Variable::MinTemperature => DailyRole::Low,
            _ => DailyRole::Other,
        }
    }

    /// File stem used when the member table for this variable is written to disk.
    pub fn table_stem(&self) -> &'static str {
        match self {
            Variable::MaxTemperature => "maxtemps",
            Variable::MinTemperature => "mintemps",
            Variable::Dewpoint => "dewpoint",
            Variable::Precipitation => "precip",
            Variable::CategoricalSnow => "snow",
            Variable::CategoricalIcePellets => "sleet",
            Variable::CategoricalFreezingRain => "fzra",
            Variable::CategoricalRain => "rain",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::MaxTemperature | Variable::MinTemperature | Variable::Dewpoint => "°F",
            Variable::Precipitation => "in",
            _ => "flag",
        }
    }
}

/// Formats a `Variable` using its table stem.
///
/// ```
/// use gefs_point::Variable;
///
/// assert_eq!(Variable::MaxTemperature.to_string(), "maxtemps");
/// assert_eq!(format!("{}", Variable::CategoricalIcePellets), "sleet");
/// ```
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_temperatures_and_dewpoint_are_range_checked() {
        for variable in Variable::ALL {
            let checked = variable.plausible_range().is_some();
            let expected = matches!(
                variable,
                Variable::MaxTemperature | Variable::MinTemperature | Variable::Dewpoint
            );
            assert_eq!(checked, expected, "unexpected QC bounds for {:?}", variable);
        }
    }

    #[test]
    fn test_reducers_per_variable() {
        assert_eq!(Variable::MaxTemperature.daily_reducer(), DailyReducer::Max);
        assert_eq!(Variable::MinTemperature.daily_reducer(), DailyReducer::Min);
        assert_eq!(Variable::Dewpoint.daily_reducer(), DailyReducer::Mean);
        assert_eq!(Variable::Precipitation.daily_reducer(), DailyReducer::Sum);
    }

    #[test]
    fn test_continuous_set_excludes_flags() {
        assert!(Variable::CONTINUOUS.iter().all(|v| !v.is_categorical()));
        assert_eq!(
            Variable::ALL.iter().filter(|v| v.is_categorical()).count(),
            4
        );
    }
}
