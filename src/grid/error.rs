use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocateGridPointError {
    #[error("Target point ({lat}, {lon}) is not a point of the forecast grid")]
    PointNotOnGrid { lat: f64, lon: f64 },

    #[error("Latitude grid {lats:?} and longitude grid {lons:?} differ in shape")]
    GridShapeMismatch { lats: (usize, usize), lons: (usize, usize) },
}
