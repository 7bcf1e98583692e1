//! # Photo-z outcome of a single query
//!
//! The [`PhotoZOutcome`] enum is the per-galaxy result record of the leave-one-out driver:
//!
//! * `Pending` – the galaxy has not been processed (cancelled run, or beyond `sample_limit`),
//! * `Estimated` – a color-matched subset was found,
//! * `NoMatch` – the subset was empty; both outputs are missing.
//!
//! `NoMatch` is an expected outcome, not an error: a galaxy whose colors are not matched by
//! any training galaxy within the χ² threshold simply has no photo-z.
use rand::Rng;

use crate::constants::Redshift;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PhotoZOutcome {
    #[default]
    Pending,
    Estimated {
        /// True redshift of the randomly drawn subset member.
        photo_z: Redshift,
        /// Population standard deviation of the subset's true redshifts.
        photo_z_err: f64,
        /// Size of the color-matched subset.
        n_neighbors: usize,
    },
    NoMatch,
}

impl PhotoZOutcome {
    pub fn photo_z(&self) -> Option<Redshift> {
        match self {
            PhotoZOutcome::Estimated { photo_z, .. } => Some(*photo_z),
            _ => None,
        }
    }

    pub fn photo_z_err(&self) -> Option<f64> {
        match self {
            PhotoZOutcome::Estimated { photo_z_err, .. } => Some(*photo_z_err),
            _ => None,
        }
    }

    pub fn n_neighbors(&self) -> usize {
        match self {
            PhotoZOutcome::Estimated { n_neighbors, .. } => *n_neighbors,
            _ => 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PhotoZOutcome::Pending)
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, PhotoZOutcome::Estimated { .. })
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, PhotoZOutcome::NoMatch)
    }
}

/// Turn a CMNN subset into a photo-z outcome.
///
/// Arguments
/// -----------------
/// * `subset`: indices into `reference_redshifts`.
/// * `reference_redshifts`: true redshifts of the reference set.
/// * `rng`: random source; exactly one `random_range` draw is consumed for a non-empty
///   subset and none for an empty one.
///
/// Return
/// ----------
/// * `PhotoZOutcome::Estimated` with the drawn member's redshift and the subset's redshift
///   standard deviation (`0.0` for a single member).
/// * `PhotoZOutcome::NoMatch` for an empty subset.
pub fn estimate_from_subset(
    subset: &[usize],
    reference_redshifts: &[Redshift],
    rng: &mut impl Rng,
) -> PhotoZOutcome {
    if subset.is_empty() {
        return PhotoZOutcome::NoMatch;
    }

    let pick = subset[rng.random_range(0..subset.len())];

    PhotoZOutcome::Estimated {
        photo_z: reference_redshifts[pick],
        photo_z_err: population_std(subset.iter().map(|&i| reference_redshifts[i])),
        n_neighbors: subset.len(),
    }
}

/// Standard deviation with `ddof = 0`; `0.0` for fewer than two values.
fn population_std<I: Iterator<Item = f64> + Clone>(values: I) -> f64 {
    let (n, sum) = values.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if n < 2 {
        return 0.0;
    }
    let mean = sum / n as f64;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_empty_subset_is_no_match() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = estimate_from_subset(&[], &[0.1, 0.2], &mut rng);
        assert_eq!(out, PhotoZOutcome::NoMatch);
        assert_eq!(out.photo_z(), None);
        assert_eq!(out.photo_z_err(), None);
        assert_eq!(out.n_neighbors(), 0);
    }

    #[test]
    fn test_single_member_has_zero_uncertainty() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = estimate_from_subset(&[1], &[0.1, 0.734, 2.0], &mut rng);
        assert_eq!(out.photo_z(), Some(0.734));
        assert_eq!(out.photo_z_err(), Some(0.0));
        assert_eq!(out.n_neighbors(), 1);
    }

    #[test]
    fn test_uncertainty_over_whole_subset() {
        let z = [0.0, 1.0, 2.0, 3.0, 9.0];
        let mut rng = StdRng::seed_from_u64(11);
        let out = estimate_from_subset(&[0, 1, 2, 3], &z, &mut rng);

        // population std of [0,1,2,3]
        assert_relative_eq!(out.photo_z_err().unwrap(), 1.25f64.sqrt(), epsilon = 1e-12);
        let pz = out.photo_z().unwrap();
        assert!([0.0, 1.0, 2.0, 3.0].contains(&pz));
        assert_eq!(out.n_neighbors(), 4);
    }

    #[test]
    fn test_draw_covers_subset_uniformly() {
        let z = [0.5, 1.5];
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits = [0usize; 2];
        for _ in 0..2000 {
            let pz = estimate_from_subset(&[0, 1], &z, &mut rng).photo_z().unwrap();
            hits[(pz > 1.0) as usize] += 1;
        }
        assert!(hits[0] > 850 && hits[1] > 850, "{hits:?}");
    }

    #[test]
    fn test_same_seed_same_draw() {
        let z: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let subset: Vec<usize> = (0..50).collect();
        let a = estimate_from_subset(&subset, &z, &mut StdRng::seed_from_u64(5));
        let b = estimate_from_subset(&subset, &z, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_is_pending() {
        assert!(PhotoZOutcome::default().is_pending());
    }
}
