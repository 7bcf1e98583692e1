//! CMNN subset selection.
//!
//! A reference galaxy `r` belongs to the color-matched subset of query `q` iff
//!
//! ```text
//! d(q,r) ≥ min_dof  ∧  threshold(d) > 0  ∧  0 < D(q,r) ≤ threshold(d)
//! ```
//!
//! Before filtering, the query's own distance is forced to
//! [`SELF_EXCLUSION_DISTANCE`], which exceeds every finite threshold: in leave-one-out
//! evaluation the query is part of the reference set and must never match itself.
//! The strict `D > 0` bound additionally drops exact color duplicates.
use crate::{cmnn::threshold::ThresholdTable, constants::SELF_EXCLUSION_DISTANCE};

use super::color_distance::ColorDistances;

/// Select the color-matched subset of reference indices for one query.
///
/// Arguments
/// -----------------
/// * `query_index`: position of the query in the reference set, or `None` when the query is
///   not part of it (no self-exclusion needed).
/// * `pairs`: output of [`color_distances`](crate::cmnn::color_distance::color_distances);
///   the query's own distance is overwritten with the self-exclusion sentinel.
/// * `thresholds`: χ² threshold table covering every DOF present in `pairs`.
/// * `min_dof`: minimum number of shared colors.
///
/// Return
/// ----------
/// * Ascending reference indices forming the subset, possibly empty.
pub fn select_cmnn_subset(
    query_index: Option<usize>,
    pairs: &mut ColorDistances,
    thresholds: &ThresholdTable,
    min_dof: usize,
) -> Vec<usize> {
    if let Some(slot) = query_index.and_then(|i| pairs.distances.get_mut(i)) {
        *slot = SELF_EXCLUSION_DISTANCE;
    }

    pairs
        .distances
        .iter()
        .zip(&pairs.dof)
        .enumerate()
        .filter(|&(_, (&distance, &dof))| {
            let threshold = thresholds.get(dof);
            dof >= min_dof && threshold > 0.0 && distance > 0.0 && distance <= threshold
        })
        .map(|(index, _)| index)
        .collect()
}
