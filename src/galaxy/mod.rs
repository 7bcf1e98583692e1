//! # Galaxy sample: colors, validity masks, and photo-z outputs
//!
//! This module defines the in-memory data model consumed by the CMNN estimator:
//!
//! * [`ColorMask`] – explicit per-dimension validity bitset,
//! * [`Galaxy`] – one catalog row reduced to colors, color uncertainties, true redshift,
//!   and the two photo-z output fields,
//! * [`Sample`] – an ordered, fixed-size collection of galaxies sharing a common color
//!   dimensionality `K`.
//!
//! Missing data
//! -----------------
//! A missing color (undetected band, non-finite input) is recorded **only** in the mask.
//! The numeric slot of a masked dimension holds `0.0` and is never read by the estimator,
//! so a missing value can never be mistaken for a real measurement.
//!
//! Submodules
//! -----------------
//! * [`photometry`](crate::galaxy::photometry) – magnitudes → colors, fluxes → AB magnitudes.
//! * [`catalog_reader`](crate::galaxy::catalog_reader) – CSV ingestion into a [`Sample`].
//! * [`catalog_writer`](crate::galaxy::catalog_writer) – CSV export of photo-z outputs.
//! * [`noise`](crate::galaxy::noise) – Gaussian photometric noise for synthetic catalogs.
use std::ops::BitAnd;

use nalgebra::DVector;

use crate::{
    cmnn_errors::CmnnError,
    constants::{Redshift, MAX_COLORS},
    leave_one_out::LooResults,
};

pub mod catalog_reader;
pub mod catalog_writer;
pub mod noise;
pub mod photometry;

/// Per-dimension validity bitset (bit `i` set ⇔ dimension `i` is present).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ColorMask(u64);

impl ColorMask {
    pub const EMPTY: ColorMask = ColorMask(0);

    /// Mask with the first `n_colors` dimensions set.
    pub fn full(n_colors: usize) -> Self {
        if n_colors >= MAX_COLORS {
            ColorMask(u64::MAX)
        } else {
            ColorMask((1u64 << n_colors) - 1)
        }
    }

    pub fn from_bools<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let mut mask = ColorMask::EMPTY;
        for (i, flag) in flags.into_iter().enumerate().take(MAX_COLORS) {
            mask.set(i, flag);
        }
        mask
    }

    #[inline]
    pub fn is_set(&self, i: usize) -> bool {
        i < MAX_COLORS && (self.0 >> i) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, present: bool) {
        if i >= MAX_COLORS {
            return;
        }
        if present {
            self.0 |= 1u64 << i;
        } else {
            self.0 &= !(1u64 << i);
        }
    }

    /// Number of present dimensions.
    #[inline]
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices of present dimensions, ascending.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let i = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(i)
        })
    }
}

impl BitAnd for ColorMask {
    type Output = ColorMask;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        ColorMask(self.0 & rhs.0)
    }
}

/// One galaxy reduced to the quantities used by the CMNN estimator.
///
/// Fields
/// -----------------
/// * `colors` / `color_errors` – `K` values each; masked slots are `0.0`.
/// * `color_mask` – colors present.
/// * `usable_mask` – colors present **and** uncertainty present, finite, and strictly positive.
///   Only these dimensions can be used when the galaxy acts as a query, since the distance is
///   normalized by the query's uncertainty.
/// * `redshift` – true (spectroscopic or simulated) redshift, used as training target.
/// * `photo_z`, `photo_z_err` – estimator outputs, `None` until estimated or when no
///   color-matched neighbor exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    colors: DVector<f64>,
    color_errors: DVector<f64>,
    color_mask: ColorMask,
    usable_mask: ColorMask,
    redshift: Redshift,
    photo_z: Option<Redshift>,
    photo_z_err: Option<f64>,
}

/// A query uncertainty is usable when its square is a normal positive float, so that
/// `Δ² / σ²` can neither divide by zero nor underflow to it.
fn usable_uncertainty(sigma: f64) -> bool {
    sigma > 0.0 && (sigma * sigma).is_normal()
}

impl Galaxy {
    /// Build a galaxy from optional colors and color uncertainties.
    ///
    /// Non-finite values are treated as missing.
    ///
    /// Return
    /// ----------
    /// * `Err(CmnnError::InvalidParameter)` if the two slices differ in length or the
    ///   redshift is not finite.
    /// * `Err(CmnnError::TooManyColors)` if more than [`MAX_COLORS`] colors are given.
    pub fn new(
        colors: &[Option<f64>],
        color_errors: &[Option<f64>],
        redshift: Redshift,
    ) -> Result<Self, CmnnError> {
        if colors.len() != color_errors.len() {
            return Err(CmnnError::InvalidParameter(format!(
                "{} colors but {} color uncertainties",
                colors.len(),
                color_errors.len()
            )));
        }
        if colors.len() > MAX_COLORS {
            return Err(CmnnError::TooManyColors(colors.len()));
        }
        if !redshift.is_finite() {
            return Err(CmnnError::InvalidParameter(format!(
                "redshift must be finite, got {redshift}"
            )));
        }

        let clean = |v: &Option<f64>| v.filter(|x| x.is_finite());
        let colors: Vec<Option<f64>> = colors.iter().map(clean).collect();
        let color_errors: Vec<Option<f64>> = color_errors.iter().map(clean).collect();

        let color_mask = ColorMask::from_bools(colors.iter().map(Option::is_some));
        let usable_mask = color_mask
            & ColorMask::from_bools(color_errors.iter().map(|e| e.is_some_and(usable_uncertainty)));

        Ok(Galaxy {
            colors: DVector::from_iterator(colors.len(), colors.iter().map(|c| c.unwrap_or(0.0))),
            color_errors: DVector::from_iterator(
                color_errors.len(),
                color_errors.iter().map(|e| e.unwrap_or(0.0)),
            ),
            color_mask,
            usable_mask,
            redshift,
            photo_z: None,
            photo_z_err: None,
        })
    }

    /// Build a galaxy with every color present.
    pub fn from_complete_colors(
        colors: &[f64],
        color_errors: &[f64],
        redshift: Redshift,
    ) -> Result<Self, CmnnError> {
        let c: Vec<Option<f64>> = colors.iter().copied().map(Some).collect();
        let e: Vec<Option<f64>> = color_errors.iter().copied().map(Some).collect();
        Galaxy::new(&c, &e, redshift)
    }

    #[inline]
    pub fn n_colors(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, i: usize) -> Option<f64> {
        self.color_mask.is_set(i).then(|| self.colors[i])
    }

    /// Uncertainty of color `i`, `None` unless the dimension is usable on the query side.
    pub fn color_error(&self, i: usize) -> Option<f64> {
        self.usable_mask.is_set(i).then(|| self.color_errors[i])
    }

    /// Raw color vector; masked slots hold `0.0`.
    pub fn colors(&self) -> &DVector<f64> {
        &self.colors
    }

    /// Raw color-uncertainty vector; masked slots hold `0.0`.
    pub fn color_errors(&self) -> &DVector<f64> {
        &self.color_errors
    }

    pub fn color_mask(&self) -> ColorMask {
        self.color_mask
    }

    pub fn usable_mask(&self) -> ColorMask {
        self.usable_mask
    }

    pub fn redshift(&self) -> Redshift {
        self.redshift
    }

    pub fn photo_z(&self) -> Option<Redshift> {
        self.photo_z
    }

    pub fn photo_z_err(&self) -> Option<f64> {
        self.photo_z_err
    }

    pub(crate) fn set_photoz(&mut self, photo_z: Option<Redshift>, photo_z_err: Option<f64>) {
        self.photo_z = photo_z;
        self.photo_z_err = photo_z_err;
    }
}

/// Ordered collection of galaxies sharing the same number of colors.
///
/// The sample is read-only for the estimator; outputs are written back in one pass
/// through [`Sample::apply_photoz`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    galaxies: Vec<Galaxy>,
    redshifts: Vec<Redshift>,
    n_colors: usize,
}

impl Sample {
    /// Wrap a list of galaxies.
    ///
    /// Return
    /// ----------
    /// * `Err(CmnnError::EmptySample)` for an empty list.
    /// * `Err(CmnnError::InconsistentDimensionality)` if any galaxy differs in `K` from the first.
    pub fn new(galaxies: Vec<Galaxy>) -> Result<Self, CmnnError> {
        let n_colors = galaxies.first().ok_or(CmnnError::EmptySample)?.n_colors();

        if let Some((index, g)) = galaxies
            .iter()
            .enumerate()
            .find(|(_, g)| g.n_colors() != n_colors)
        {
            return Err(CmnnError::InconsistentDimensionality {
                index,
                expected: n_colors,
                found: g.n_colors(),
            });
        }

        let redshifts = galaxies.iter().map(Galaxy::redshift).collect();
        Ok(Sample {
            galaxies,
            redshifts,
            n_colors,
        })
    }

    #[inline]
    pub fn n_colors(&self) -> usize {
        self.n_colors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.galaxies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.galaxies.is_empty()
    }

    pub fn galaxies(&self) -> &[Galaxy] {
        &self.galaxies
    }

    pub fn get(&self, index: usize) -> Option<&Galaxy> {
        self.galaxies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Galaxy> {
        self.galaxies.iter()
    }

    /// True redshifts in sample order.
    pub fn redshifts(&self) -> &[Redshift] {
        &self.redshifts
    }

    /// Write leave-one-out outputs into each galaxy's photo-z fields.
    ///
    /// Galaxies beyond the end of `results`, or whose outcome is still pending,
    /// keep their current outputs.
    pub fn apply_photoz(&mut self, results: &LooResults) {
        for (galaxy, outcome) in self.galaxies.iter_mut().zip(results.outcomes()) {
            if outcome.is_pending() {
                continue;
            }
            galaxy.set_photoz(outcome.photo_z(), outcome.photo_z_err());
        }
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a Galaxy;
    type IntoIter = std::slice::Iter<'a, Galaxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.galaxies.iter()
    }
}
