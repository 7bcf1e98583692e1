//! # Pairwise color distance
//!
//! For a query galaxy `q` and every reference galaxy `r`:
//!
//! ```text
//! D(q,r) = Σ_i∈V(q,r) (c_q[i] − c_r[i])² / σ_q[i]²
//! d(q,r) = |V(q,r)|
//! ```
//!
//! where `V(q,r)` is the set of dimensions valid for the pair: the query's color is present
//! and its uncertainty is finite and strictly positive, and the reference's color is present.
//! Normalization always uses the **query's** uncertainty. Invalid dimensions contribute to
//! neither the sum nor the count.
//!
//! This is a diagonal-covariance weighted squared difference, not a Mahalanobis distance with
//! a joint covariance matrix. `D` and `d` are only meaningful together and are returned as a
//! single [`ColorDistances`] value.
use crate::galaxy::{ColorMask, Galaxy};

/// Distances and degrees of freedom from one query to every reference galaxy,
/// aligned with the reference slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDistances {
    pub distances: Vec<f64>,
    pub dof: Vec<usize>,
}

impl ColorDistances {
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Dimensions the query can contribute to any pair.
#[inline]
pub fn query_usable_mask(query: &Galaxy) -> ColorMask {
    query.usable_mask()
}

/// Distance and degrees of freedom between `query` and one `reference` galaxy.
pub fn pair_distance(query: &Galaxy, reference: &Galaxy) -> (f64, usize) {
    let valid = query_usable_mask(query) & reference.color_mask();

    let qc = query.colors();
    let qe = query.color_errors();
    let rc = reference.colors();

    let distance = valid
        .iter_set()
        .map(|i| {
            let delta = qc[i] - rc[i];
            delta * delta / (qe[i] * qe[i])
        })
        .sum();

    (distance, valid.count())
}

/// Distances and degrees of freedom from `query` to each galaxy of `reference`.
pub fn color_distances(query: &Galaxy, reference: &[Galaxy]) -> ColorDistances {
    let (distances, dof) = reference
        .iter()
        .map(|r| pair_distance(query, r))
        .unzip();
    ColorDistances { distances, dof }
}
