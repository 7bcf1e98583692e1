//! # Photometry helpers
//!
//! Conversions from catalog photometry to the color space used by the CMNN estimator.
//!
//! * Colors are differences of **adjacent** bands: `color[i] = mag[i] − mag[i+1]`.
//! * Color uncertainties add in quadrature: `σ_c[i] = sqrt(σ_m[i]² + σ_m[i+1]²)`.
//! * A missing magnitude (non-detection) makes both neighboring colors missing;
//!   a missing magnitude error makes both neighboring color errors missing.
//!
//! Fluxes are expected in **nanojansky**, the unit of the simulated survey catalogs,
//! with AB zero point [`AB_ZERO_POINT_NJY`].
use std::f64::consts::LN_10;

use itertools::Itertools;

use crate::{
    cmnn_errors::CmnnError,
    constants::{Magnitude, Redshift, AB_ZERO_POINT_NJY},
    galaxy::Galaxy,
};

/// Derive `K − 1` colors and color uncertainties from `K` band magnitudes.
///
/// Arguments
/// -----------------
/// * `magnitudes`: per-band magnitudes, bluest first; `None` marks a non-detection.
/// * `magnitude_errors`: per-band 1-σ magnitude uncertainties.
///
/// Return
/// ----------
/// * `(colors, color_errors)`, each of length `K − 1` (empty if `K < 2`).
/// * `Err(CmnnError::InvalidParameter)` if the two inputs differ in length.
pub fn colors_from_magnitudes(
    magnitudes: &[Option<Magnitude>],
    magnitude_errors: &[Option<f64>],
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), CmnnError> {
    if magnitudes.len() != magnitude_errors.len() {
        return Err(CmnnError::InvalidParameter(format!(
            "{} magnitudes but {} magnitude errors",
            magnitudes.len(),
            magnitude_errors.len()
        )));
    }

    let finite = |v: &Option<f64>| v.filter(|x| x.is_finite());

    let colors = magnitudes
        .iter()
        .map(finite)
        .tuple_windows()
        .map(|(blue, red)| Some(blue? - red?))
        .collect();

    let color_errors = magnitude_errors
        .iter()
        .map(finite)
        .tuple_windows()
        .map(|(blue, red)| Some(blue?.hypot(red?)))
        .collect();

    Ok((colors, color_errors))
}

/// AB magnitude of a flux in nanojansky; `None` for non-positive or non-finite flux.
pub fn flux_to_ab_magnitude(flux_njy: f64) -> Option<Magnitude> {
    (flux_njy.is_finite() && flux_njy > 0.0).then(|| -2.5 * flux_njy.log10() + AB_ZERO_POINT_NJY)
}

/// Magnitude uncertainty propagated from a flux uncertainty: `(2.5 / ln 10) · σ_f / f`.
pub fn flux_err_to_magnitude_err(flux_njy: f64, flux_err_njy: f64) -> Option<f64> {
    (flux_njy.is_finite() && flux_njy > 0.0 && flux_err_njy.is_finite() && flux_err_njy >= 0.0)
        .then(|| 2.5 / LN_10 * flux_err_njy / flux_njy)
}

impl Galaxy {
    /// Build a galaxy from per-band magnitudes (see [`colors_from_magnitudes`]).
    pub fn from_magnitudes(
        magnitudes: &[Option<Magnitude>],
        magnitude_errors: &[Option<f64>],
        redshift: Redshift,
    ) -> Result<Self, CmnnError> {
        let (colors, color_errors) = colors_from_magnitudes(magnitudes, magnitude_errors)?;
        Galaxy::new(&colors, &color_errors, redshift)
    }

    /// Build a galaxy from per-band fluxes in nanojansky.
    pub fn from_fluxes(
        fluxes_njy: &[f64],
        flux_errors_njy: &[f64],
        redshift: Redshift,
    ) -> Result<Self, CmnnError> {
        if fluxes_njy.len() != flux_errors_njy.len() {
            return Err(CmnnError::InvalidParameter(format!(
                "{} fluxes but {} flux errors",
                fluxes_njy.len(),
                flux_errors_njy.len()
            )));
        }
        let mags: Vec<_> = fluxes_njy.iter().map(|&f| flux_to_ab_magnitude(f)).collect();
        let errs: Vec<_> = fluxes_njy
            .iter()
            .zip(flux_errors_njy)
            .map(|(&f, &e)| flux_err_to_magnitude_err(f, e))
            .collect();
        Galaxy::from_magnitudes(&mags, &errs, redshift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_adjacent_band_colors() {
        let mags = [Some(24.0), Some(23.5), Some(23.2)];
        let errs = [Some(0.3), Some(0.4), Some(0.0)];
        let (c, e) = colors_from_magnitudes(&mags, &errs).unwrap();

        assert_eq!(c.len(), 2);
        assert_relative_eq!(c[0].unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(c[1].unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(e[0].unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(e[1].unwrap(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_magnitude_propagates_to_both_colors() {
        let mags = [Some(24.0), None, Some(23.2), Some(23.0)];
        let errs = [Some(0.1), Some(0.1), Some(0.1), Some(0.1)];
        let (c, e) = colors_from_magnitudes(&mags, &errs).unwrap();

        assert_eq!(c[0], None);
        assert_eq!(c[1], None);
        assert!(c[2].is_some());
        // errors are independent of the magnitude mask
        assert!(e.iter().all(Option::is_some));

        let (c, _) = colors_from_magnitudes(&[Some(f64::NAN), Some(20.0)], &[Some(0.1); 2]).unwrap();
        assert_eq!(c, vec![None]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(colors_from_magnitudes(&[Some(1.0)], &[]).is_err());
        assert!(Galaxy::from_fluxes(&[1.0, 2.0], &[0.1], 0.5).is_err());
    }

    #[test]
    fn test_flux_conversion() {
        // 3631 Jy is AB magnitude zero
        assert_relative_eq!(flux_to_ab_magnitude(3631.0e9).unwrap(), 0.0, epsilon = 1e-3);
        assert_relative_eq!(flux_to_ab_magnitude(1.0).unwrap(), 31.4, epsilon = 1e-12);
        assert_eq!(flux_to_ab_magnitude(0.0), None);
        assert_eq!(flux_to_ab_magnitude(-5.0), None);

        assert_relative_eq!(
            flux_err_to_magnitude_err(100.0, 10.0).unwrap(),
            0.108_573_620_475_812_95,
            epsilon = 1e-12
        );
        assert_eq!(flux_err_to_magnitude_err(-1.0, 1.0), None);
    }

    #[test]
    fn test_galaxy_from_fluxes_drops_non_detection() {
        let g = Galaxy::from_fluxes(&[100.0, -3.0, 150.0], &[5.0, 5.0, 5.0], 1.2).unwrap();
        assert_eq!(g.n_colors(), 2);
        assert_eq!(g.color(0), None);
        assert_eq!(g.color(1), None);
        assert_eq!(g.redshift(), 1.2);
    }
}
