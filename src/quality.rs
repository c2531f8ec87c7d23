//! Plausibility checks applied to converted values before they enter a matrix.

use crate::types::variable::Variable;

/// Returns the value if it is plausible for `variable`, otherwise MISSING.
///
/// Range-checked variables (temperatures and dewpoint) keep values inside their
/// bounds, bounds included. Precipitation and categorical flags are trusted as
/// decoded. A non-finite value is never a reading and always becomes MISSING.
///
/// ```
/// use gefs_point::{accept, Variable};
///
/// assert_eq!(accept(Variable::MaxTemperature, 150.0), Some(150.0));
/// assert_eq!(accept(Variable::MaxTemperature, 150.01), None);
/// assert_eq!(accept(Variable::Precipitation, 40.0), Some(40.0));
/// ```
pub fn accept(variable: Variable, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match variable.plausible_range() {
        Some((low, high)) if value < low || value > high => None,
        _ => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds_are_inclusive() {
        for variable in [Variable::MaxTemperature, Variable::MinTemperature] {
            assert_eq!(accept(variable, 150.0), Some(150.0));
            assert_eq!(accept(variable, 150.01), None);
            assert_eq!(accept(variable, -100.0), Some(-100.0));
            assert_eq!(accept(variable, -100.01), None);
        }
    }

    #[test]
    fn test_dewpoint_bounds() {
        assert_eq!(accept(Variable::Dewpoint, 100.0), Some(100.0));
        assert_eq!(accept(Variable::Dewpoint, 100.5), None);
        assert_eq!(accept(Variable::Dewpoint, -50.0), Some(-50.0));
        assert_eq!(accept(Variable::Dewpoint, -50.5), None);
    }

    #[test]
    fn test_rejected_values_are_missing_not_zero_or_clipped() {
        assert_eq!(accept(Variable::MaxTemperature, 9999.0), None);
        assert_eq!(accept(Variable::MinTemperature, -459.67), None);
    }

    #[test]
    fn test_precipitation_and_flags_never_range_filtered() {
        assert_eq!(accept(Variable::Precipitation, 1000.0), Some(1000.0));
        assert_eq!(accept(Variable::Precipitation, -1.0), Some(-1.0));
        assert_eq!(accept(Variable::CategoricalRain, 1.0), Some(1.0));
        assert_eq!(accept(Variable::CategoricalSnow, 7.0), Some(7.0));
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert_eq!(accept(Variable::Dewpoint, f64::NAN), None);
        assert_eq!(accept(Variable::Precipitation, f64::INFINITY), None);
    }
}
