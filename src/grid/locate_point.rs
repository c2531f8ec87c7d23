//! Rectangular lat/lon grids and exact grid-point lookup for the target location.

use crate::grid::error::LocateGridPointError;
use crate::types::location::TargetPoint;
use ndarray::Array2;

/// Latitude and longitude of every cell of a forecast grid, in degrees.
///
/// Longitudes use the [0, 360) convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub lats: Array2<f64>,
    pub lons: Array2<f64>,
}

impl Grid {
    pub fn new(lats: Array2<f64>, lons: Array2<f64>) -> Self {
        Self { lats, lons }
    }

    /// Builds a regular grid whose rows step in latitude and columns in longitude.
    ///
    /// ```
    /// use gefs_point::Grid;
    ///
    /// // global 1° grid, north to south
    /// let grid = Grid::regular(90.0, -1.0, 181, 0.0, 1.0, 360);
    /// assert_eq!(grid.shape(), (181, 360));
    /// assert_eq!(grid.lats[[57, 0]], 33.0);
    /// assert_eq!(grid.lons[[0, 263]], 263.0);
    /// ```
    pub fn regular(
        first_lat: f64,
        lat_step: f64,
        rows: usize,
        first_lon: f64,
        lon_step: f64,
        cols: usize,
    ) -> Self {
        Self {
            lats: Array2::from_shape_fn((rows, cols), |(r, _)| first_lat + r as f64 * lat_step),
            lons: Array2::from_shape_fn((rows, cols), |(_, c)| first_lon + c as f64 * lon_step),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.lats.dim()
    }
}

/// One decoded field together with the grid it is defined on.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub values: Array2<f64>,
    pub grid: Grid,
}

impl GridField {
    pub fn new(values: Array2<f64>, grid: Grid) -> Self {
        Self { values, grid }
    }

    pub fn value_at(&self, index: GridIndex) -> Option<f64> {
        self.values.get((index.row, index.col)).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

/// Finds the grid cell holding a run's [`TargetPoint`].
///
/// The lookup is an exact match against the grid coordinates, so it only
/// succeeds when the grid has a cell at the rounded target position.
#[derive(Debug, Clone, Copy)]
pub struct GridPointLocator {
    target: TargetPoint,
}

impl GridPointLocator {
    pub fn new(target: TargetPoint) -> Self {
        Self { target }
    }

    pub fn target(&self) -> TargetPoint {
        self.target
    }

    pub fn locate(&self, grid: &Grid) -> Result<GridIndex, LocateGridPointError> {
        if grid.lats.dim() != grid.lons.dim() {
            return Err(LocateGridPointError::GridShapeMismatch {
                lats: grid.lats.dim(),
                lons: grid.lons.dim(),
            });
        }
        let lat = self.target.latitude();
        let lon = self.target.longitude();

        grid.lats
            .indexed_iter()
            .find(|&((row, col), &cell_lat)| cell_lat == lat && grid.lons[[row, col]] == lon)
            .map(|((row, col), _)| GridIndex { row, col })
            .ok_or(LocateGridPointError::PointNotOnGrid { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::location::LatLon;

    fn global_grid() -> Grid {
        Grid::regular(90.0, -1.0, 181, 0.0, 1.0, 360)
    }

    #[test]
    fn test_locate_dfw_on_global_grid() -> Result<(), Box<dyn std::error::Error>> {
        let grid = global_grid();
        let locator = GridPointLocator::new(TargetPoint::new(LatLon(32.896944, -97.038056)));
        let index = locator.locate(&grid)?;
        assert_eq!(grid.lats[[index.row, index.col]], 33.0);
        assert_eq!(grid.lons[[index.row, index.col]], 263.0);
        assert_eq!(index, GridIndex { row: 57, col: 263 });
        Ok(())
    }

    #[test]
    fn test_located_cell_matches_rounded_target() -> Result<(), Box<dyn std::error::Error>> {
        let grid = global_grid();
        let targets = [
            LatLon(-33.9, 151.2),
            LatLon(51.48, -0.3),
            LatLon(0.0, 0.0),
            LatLon(-89.6, -179.7),
            LatLon(64.8, 212.4),
        ];
        for requested in targets {
            let target = TargetPoint::new(requested);
            let index = GridPointLocator::new(target).locate(&grid)?;
            assert_eq!(grid.lats[[index.row, index.col]], requested.0.round());
            assert_eq!(
                grid.lons[[index.row, index.col]],
                crate::types::location::normalize_longitude(requested.1.round())
            );
        }
        Ok(())
    }

    #[test]
    fn test_point_outside_coverage_fails() {
        // regional grid over the southern plains
        let grid = Grid::regular(40.0, -1.0, 10, 255.0, 1.0, 15);
        let locator = GridPointLocator::new(TargetPoint::new(LatLon(51.5, -0.12)));
        assert!(matches!(
            locator.locate(&grid),
            Err(LocateGridPointError::PointNotOnGrid { .. })
        ));
    }

    #[test]
    fn test_half_degree_grid_without_integer_points_fails() {
        let grid = Grid::regular(40.25, -0.5, 10, 255.25, 0.5, 10);
        let locator = GridPointLocator::new(TargetPoint::new(LatLon(38.0, -102.0)));
        assert!(locator.locate(&grid).is_err());
    }

    #[test]
    fn test_shape_mismatch_reported() {
        let grid = Grid::new(Array2::zeros((3, 3)), Array2::zeros((3, 4)));
        let locator = GridPointLocator::new(TargetPoint::new(LatLon(0.0, 0.0)));
        assert_eq!(
            locator.locate(&grid),
            Err(LocateGridPointError::GridShapeMismatch {
                lats: (3, 3),
                lons: (3, 4)
            })
        );
    }
}
