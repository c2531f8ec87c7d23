//! Geographic coordinates and the normalized forecast target point.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are in decimal degrees; longitude may use either the -180..180 or
/// the 0..360 convention.
///
/// # Examples
///
/// ```
/// use gefs_point::LatLon;
///
/// let dfw = LatLon(32.896944, -97.038056);
/// assert_eq!(dfw.0, 32.896944); // Latitude
/// assert_eq!(dfw.1, -97.038056); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

/// Maps a longitude onto the [0, 360) convention used by the forecast grids.
///
/// Negative longitudes are shifted by 360 degrees; values already in range are
/// returned unchanged, so applying this twice is the same as applying it once.
///
/// ```
/// use gefs_point::normalize_longitude;
///
/// assert_eq!(normalize_longitude(-97.0), 263.0);
/// assert_eq!(normalize_longitude(263.0), 263.0);
/// ```
pub fn normalize_longitude(longitude: f64) -> f64 {
    let wrapped = longitude.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        // adding 0.0 turns -0.0 into 0.0
        wrapped + 0.0
    }
}

/// The grid-aligned point a run extracts values for.
///
/// Built once per run from the configured [`LatLon`]: latitude and longitude are
/// rounded to the nearest whole degree (the grid resolution, halves to even) and
/// the longitude is then normalized to [0, 360). Nothing downstream normalizes again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    latitude: f64,
    longitude: f64,
}

impl TargetPoint {
    pub fn new(requested: LatLon) -> Self {
        Self {
            latitude: requested.0.round_ties_even() + 0.0,
            longitude: normalize_longitude(requested.1.round_ties_even()),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<LatLon> for TargetPoint {
    fn from(value: LatLon) -> Self {
        TargetPoint::new(value)
    }
}
