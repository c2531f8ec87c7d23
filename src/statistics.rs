//! Reductions across the member axis of an [`EnsembleMatrix`].

use crate::types::ensemble_matrix::EnsembleMatrix;

/// Mean of the present values in a slice, or `None` if every entry is MISSING.
pub(crate) fn nan_mean<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Per lead time, the arithmetic mean over the members that are not MISSING.
///
/// A lead time with no member values is MISSING.
pub fn mean_across_members(matrix: &EnsembleMatrix) -> Vec<Option<f64>> {
    matrix.columns().map(|column| nan_mean(column.iter())).collect()
}

/// Per lead time, the summed member flags divided by the configured ensemble size.
///
/// The denominator is `ensemble_size` and not the number of members present,
/// so missing members lower the fraction. A lead time where every member is
/// MISSING yields MISSING rather than zero.
pub fn fraction_flagged(matrix: &EnsembleMatrix, ensemble_size: usize) -> Vec<Option<f64>> {
    if ensemble_size == 0 {
        return vec![None; matrix.lead_times()];
    }
    matrix
        .columns()
        .map(|column| {
            let present: Vec<f64> = column.iter().flatten().copied().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / ensemble_size as f64)
            }
        })
        .collect()
}

/// Running total of a series. MISSING steps stay MISSING and do not reset the total.
pub fn cumulative_sum(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    series
        .iter()
        .map(|value| {
            value.map(|v| {
                total += v;
                total
            })
        })
        .collect()
}
