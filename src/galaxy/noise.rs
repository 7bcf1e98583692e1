//! Gaussian photometric noise for synthetic catalogs.
//!
//! Each present magnitude with a usable uncertainty `σ` is replaced by a draw from
//! `N(m, (scale · σ)²)`. Missing magnitudes stay missing; magnitudes without an
//! uncertainty are returned unchanged.
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{
    cmnn_errors::CmnnError,
    constants::{Magnitude, Redshift},
    galaxy::Galaxy,
};

/// Perturb magnitudes with Gaussian noise scaled by their uncertainties.
///
/// Arguments
/// -----------------
/// * `magnitudes`, `magnitude_errors`: per-band values, same length.
/// * `noise_scale`: multiplier on the nominal uncertainties (`1.0` = nominal).
/// * `rng`: random source, consumed once per perturbed band in band order.
///
/// Return
/// ----------
/// * The perturbed magnitudes, or an error for a negative / non-finite scale.
pub fn perturb_magnitudes(
    magnitudes: &[Option<Magnitude>],
    magnitude_errors: &[Option<f64>],
    noise_scale: f64,
    rng: &mut impl Rng,
) -> Result<Vec<Option<Magnitude>>, CmnnError> {
    if !(noise_scale.is_finite() && noise_scale >= 0.0) {
        return Err(CmnnError::InvalidParameter(
            "noise_scale must be finite and non-negative".into(),
        ));
    }
    if magnitudes.len() != magnitude_errors.len() {
        return Err(CmnnError::InvalidParameter(format!(
            "{} magnitudes but {} magnitude errors",
            magnitudes.len(),
            magnitude_errors.len()
        )));
    }

    magnitudes
        .iter()
        .zip(magnitude_errors)
        .map(|(mag, err)| -> Result<Option<Magnitude>, CmnnError> {
            match (mag, err) {
                (Some(m), Some(e)) if e.is_finite() && *e > 0.0 => {
                    let normal = Normal::new(*m, noise_scale * e)?;
                    Ok(Some(normal.sample(&mut *rng)))
                }
                _ => Ok(*mag),
            }
        })
        .collect()
}

/// Build an "observed" galaxy from noiseless magnitudes and their uncertainties.
pub fn simulate_observed_galaxy(
    true_magnitudes: &[Option<Magnitude>],
    magnitude_errors: &[Option<f64>],
    redshift: Redshift,
    rng: &mut impl Rng,
) -> Result<Galaxy, CmnnError> {
    let observed = perturb_magnitudes(true_magnitudes, magnitude_errors, 1.0, rng)?;
    Galaxy::from_magnitudes(&observed, magnitude_errors, redshift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_missing_and_errorless_bands_untouched() {
        let mut rng = StdRng::seed_from_u64(7);
        let mags = [Some(24.0), None, Some(22.0)];
        let errs = [Some(0.1), Some(0.1), None];
        let out = perturb_magnitudes(&mags, &errs, 1.0, &mut rng).unwrap();

        assert!(out[0].is_some());
        assert_ne!(out[0], Some(24.0));
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(22.0));
    }

    #[test]
    fn test_zero_scale_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let mags = [Some(24.0), Some(23.0)];
        let errs = [Some(0.1), Some(0.2)];
        let out = perturb_magnitudes(&mags, &errs, 0.0, &mut rng).unwrap();
        assert_eq!(out, mags.to_vec());
    }

    #[test]
    fn test_seeded_noise_is_reproducible_and_scaled() {
        let mags = vec![Some(23.0); 2000];
        let errs = vec![Some(0.1); 2000];

        let a = perturb_magnitudes(&mags, &errs, 1.0, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = perturb_magnitudes(&mags, &errs, 1.0, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);

        let n = a.len() as f64;
        let mean = a.iter().map(|m| m.unwrap()).sum::<f64>() / n;
        let var = a.iter().map(|m| (m.unwrap() - mean).powi(2)).sum::<f64>() / n;
        assert!((mean - 23.0).abs() < 0.01);
        assert!((var.sqrt() - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_invalid_scale() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(perturb_magnitudes(&[Some(1.0)], &[Some(0.1)], -1.0, &mut rng).is_err());
        assert!(perturb_magnitudes(&[Some(1.0)], &[Some(0.1)], f64::NAN, &mut rng).is_err());
    }
}
