//! Unit conversions applied to decoded fields before they are stored.
//!
//! All functions are plain scalar functions; [`convert_field`] lifts any of them
//! over a whole decoded array.

use ndarray::Array2;

const KELVIN_OFFSET: f64 = 273.15;
const RANKINE_OFFSET: f64 = 459.67;
const INCHES_PER_MM: f64 = 0.0393701;

pub fn kelvin_to_fahrenheit(temperature: f64) -> f64 {
    temperature * (9.0 / 5.0) - RANKINE_OFFSET
}

pub fn fahrenheit_to_kelvin(temperature: f64) -> f64 {
    (temperature + RANKINE_OFFSET) * (5.0 / 9.0)
}

pub fn kelvin_to_celsius(temperature: f64) -> f64 {
    temperature - KELVIN_OFFSET
}

pub fn celsius_to_fahrenheit(temperature: f64) -> f64 {
    1.8 * temperature + 32.0
}

pub fn mm_to_inches(precipitation: f64) -> f64 {
    precipitation * INCHES_PER_MM
}

/// Magnus-form dewpoint in °C from relative humidity (percent) and temperature (°C).
///
/// Returns NaN when the logarithm's argument is not positive (e.g. 0 % humidity).
pub fn dewpoint_celsius(relative_humidity: f64, temperature: f64) -> f64 {
    let saturation_pressure = 6.11 * 10f64.powf((7.5 * temperature) / (237.3 + temperature));
    let ratio = (saturation_pressure * relative_humidity) / 611.0;
    if ratio.is_nan() || ratio <= 0.0 {
        return f64::NAN;
    }
    let log_ratio = ratio.ln();
    (237.3 * log_ratio) / (7.5 * std::f64::consts::LN_10 - log_ratio)
}

/// Dewpoint in °F; see [`dewpoint_celsius`].
pub fn dewpoint_fahrenheit(relative_humidity: f64, temperature: f64) -> f64 {
    celsius_to_fahrenheit(dewpoint_celsius(relative_humidity, temperature))
}

/// Applies a scalar conversion to every cell of a decoded field.
pub fn convert_field(field: &Array2<f64>, conversion: fn(f64) -> f64) -> Array2<f64> {
    field.mapv(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_fahrenheit_round_trip() {
        let mut kelvin = 200.0;
        while kelvin <= 330.0 {
            let back = fahrenheit_to_kelvin(kelvin_to_fahrenheit(kelvin));
            assert!((back - kelvin).abs() < 1e-9, "{} came back as {}", kelvin, back);
            kelvin += 2.5;
        }
    }

    #[test]
    fn test_known_temperatures() {
        assert!((kelvin_to_fahrenheit(273.15) - 32.0).abs() < 1e-9);
        assert!((kelvin_to_fahrenheit(373.15) - 212.0).abs() < 1e-9);
        assert!((kelvin_to_celsius(273.15)).abs() < 1e-12);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_mm_to_inches() {
        assert!((mm_to_inches(25.4) - 1.0).abs() < 1e-5);
        assert_eq!(mm_to_inches(0.0), 0.0);
    }

    #[test]
    fn test_dewpoint_equals_temperature_at_saturation() {
        for t in [-20.0, 0.0, 12.5, 30.0] {
            let td = dewpoint_celsius(100.0, t);
            assert!((td - t).abs() < 1e-9, "Td {} != T {} at 100%", td, t);
        }
    }

    #[test]
    fn test_dewpoint_half_saturation() {
        let td = dewpoint_celsius(50.0, 20.0);
        assert!(td > 9.0 && td < 9.6, "unexpected dewpoint {}", td);
        let td_f = dewpoint_fahrenheit(50.0, 20.0);
        assert!((td_f - celsius_to_fahrenheit(td)).abs() < 1e-12);
    }

    #[test]
    fn test_dewpoint_dry_air_is_nan() {
        assert!(dewpoint_celsius(0.0, 20.0).is_nan());
        assert!(dewpoint_celsius(-5.0, 20.0).is_nan());
        assert!(dewpoint_fahrenheit(0.0, 20.0).is_nan());
    }

    #[test]
    fn test_convert_field() {
        let field = Array2::from_elem((2, 2), 273.15);
        let converted = convert_field(&field, kelvin_to_fahrenheit);
        assert!(converted.iter().all(|v| (v - 32.0).abs() < 1e-9));
    }
}
