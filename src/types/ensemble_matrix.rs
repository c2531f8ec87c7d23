//! Member × lead-time storage for one tracked variable.

use crate::types::variable::Variable;
use ndarray::{Array2, ArrayView1, Axis};
use std::collections::BTreeMap;

/// Position of one forecast file in the ensemble: zero-based member and lead-time index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    pub member: usize,
    pub lead_time: usize,
}

impl CellIndex {
    pub fn new(member: usize, lead_time: usize) -> Self {
        Self { member, lead_time }
    }
}

/// A fixed-shape (members × lead times) matrix of optional values.
///
/// Every cell starts out as `None` (MISSING), which is distinct from a decoded
/// zero. The shape never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMatrix {
    values: Array2<Option<f64>>,
}

impl EnsembleMatrix {
    pub fn new(members: usize, lead_times: usize) -> Self {
        Self {
            values: Array2::from_elem((members, lead_times), None),
        }
    }

    /// Wraps rows of member values; every row must have the same length.
    ///
    /// Returns `None` when the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Option<Self> {
        let members = rows.len();
        let lead_times = rows.first().map_or(0, Vec::len);
        let flat: Vec<Option<f64>> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((members, lead_times), flat)
            .ok()
            .map(|values| Self { values })
    }

    pub fn members(&self) -> usize {
        self.values.nrows()
    }

    pub fn lead_times(&self) -> usize {
        self.values.ncols()
    }

    /// Value at a cell; out-of-range indices read as MISSING.
    pub fn get(&self, cell: CellIndex) -> Option<f64> {
        self.values
            .get((cell.member, cell.lead_time))
            .copied()
            .flatten()
    }

    /// Overwrites a cell. Returns `false` if the index lies outside the matrix.
    pub fn set(&mut self, cell: CellIndex, value: Option<f64>) -> bool {
        match self.values.get_mut((cell.member, cell.lead_time)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// All member values at one lead time.
    pub fn lead_time_column(&self, lead_time: usize) -> ArrayView1<'_, Option<f64>> {
        self.values.column(lead_time)
    }

    /// Iterates lead-time columns in order.
    pub fn columns(&self) -> impl Iterator<Item = ArrayView1<'_, Option<f64>>> {
        self.values.axis_iter(Axis(1))
    }

    /// The forecast trajectory of one member.
    pub fn member_series(&self, member: usize) -> Vec<Option<f64>> {
        self.values.row(member).to_vec()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// One [`EnsembleMatrix`] per tracked [`Variable`], all of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMatrices {
    matrices: BTreeMap<Variable, EnsembleMatrix>,
}

impl VariableMatrices {
    pub fn new(members: usize, lead_times: usize) -> Self {
        let matrices = Variable::ALL
            .iter()
            .map(|v| (*v, EnsembleMatrix::new(members, lead_times)))
            .collect();
        Self { matrices }
    }

    pub fn get(&self, variable: Variable) -> &EnsembleMatrix {
        // every variable is inserted in `new` and never removed
        &self.matrices[&variable]
    }

    pub fn set(&mut self, variable: Variable, cell: CellIndex, value: Option<f64>) -> bool {
        self.matrices
            .get_mut(&variable)
            .is_some_and(|m| m.set(cell, value))
    }

    /// Marks one cell MISSING in every variable.
    pub fn clear_cell(&mut self, cell: CellIndex) {
        for matrix in self.matrices.values_mut() {
            matrix.set(cell, None);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &EnsembleMatrix)> {
        self.matrices.iter().map(|(v, m)| (*v, m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_is_all_missing() {
        let matrix = EnsembleMatrix::new(20, 65);
        assert_eq!(matrix.members(), 20);
        assert_eq!(matrix.lead_times(), 65);
        assert_eq!(matrix.missing_count(), 20 * 65);
    }

    #[test]
    fn test_set_overwrites_rather_than_accumulates() {
        let mut matrix = EnsembleMatrix::new(2, 3);
        let cell = CellIndex::new(1, 2);
        assert!(matrix.set(cell, Some(4.0)));
        assert!(matrix.set(cell, Some(6.0)));
        assert_eq!(matrix.get(cell), Some(6.0));
        assert!(!matrix.set(CellIndex::new(2, 0), Some(1.0)));
        assert_eq!(matrix.get(CellIndex::new(2, 0)), None);
    }

    #[test]
    fn test_zero_is_not_missing() {
        let mut matrix = EnsembleMatrix::new(1, 1);
        matrix.set(CellIndex::new(0, 0), Some(0.0));
        assert_eq!(matrix.get(CellIndex::new(0, 0)), Some(0.0));
        assert_eq!(matrix.missing_count(), 0);
    }

    #[test]
    fn test_clear_cell_touches_every_variable() {
        let mut matrices = VariableMatrices::new(2, 2);
        let cell = CellIndex::new(0, 1);
        for v in Variable::ALL {
            matrices.set(v, cell, Some(1.0));
        }
        matrices.clear_cell(cell);
        for (variable, matrix) in matrices.iter() {
            assert_eq!(matrix.get(cell), None, "{:?} not cleared", variable);
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(EnsembleMatrix::from_rows(vec![vec![Some(1.0)], vec![]]).is_none());
        let matrix = EnsembleMatrix::from_rows(vec![vec![Some(1.0), None], vec![None, Some(2.0)]])
            .expect("square rows");
        assert_eq!(matrix.member_series(1), vec![None, Some(2.0)]);
    }
}
