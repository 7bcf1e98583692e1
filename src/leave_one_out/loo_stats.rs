//! # Leave-one-out summaries
//!
//! * [`LooSummary`] – how many galaxies received an estimate, had no color-matched
//!   neighbor, or were left pending.
//! * [`PhotoZQuality`] – standard photo-z accuracy statistics over the estimated galaxies,
//!   computed on the normalized residual `Δz_(1+z) = (z_phot − z_true) / (1 + z_true)`:
//!   * `bias` – mean residual,
//!   * `std` – standard deviation of the residual,
//!   * `robust_std` – interquartile range / 1.349,
//!   * `outlier_fraction` – fraction with `|Δz_(1+z)| > max(0.06, 3 · robust_std)`.
//!
//! Both types print a compact single line with `{}` and an aligned multi-line block with `{:#}`.
use std::fmt;

use crate::{
    cmnn::photoz_result::PhotoZOutcome,
    constants::{Redshift, IQR_TO_SIGMA, MIN_OUTLIER_CUT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LooSummary {
    pub total: usize,
    pub estimated: usize,
    pub no_match: usize,
    pub pending: usize,
}

impl LooSummary {
    pub fn from_outcomes(outcomes: &[PhotoZOutcome]) -> Self {
        outcomes.iter().fold(
            LooSummary {
                total: outcomes.len(),
                ..Default::default()
            },
            |mut s, o| {
                match o {
                    PhotoZOutcome::Pending => s.pending += 1,
                    PhotoZOutcome::Estimated { .. } => s.estimated += 1,
                    PhotoZOutcome::NoMatch => s.no_match += 1,
                }
                s
            },
        )
    }

    /// Galaxies that went through the estimator.
    pub fn processed(&self) -> usize {
        self.estimated + self.no_match
    }

    /// Fraction of processed galaxies without a color-matched neighbor.
    pub fn no_match_fraction(&self) -> f64 {
        match self.processed() {
            0 => 0.0,
            n => self.no_match as f64 / n as f64,
        }
    }
}

impl fmt::Display for LooSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "CMNN leave-one-out summary")?;
            writeln!(f, "--------------------------")?;
            writeln!(f, "galaxies  : {}", self.total)?;
            writeln!(f, "estimated : {}", self.estimated)?;
            writeln!(f, "no match  : {}", self.no_match)?;
            write!(f, "pending   : {}", self.pending)
        } else {
            write!(
                f,
                "galaxies={}, estimated={}, no_match={}, pending={}",
                self.total, self.estimated, self.no_match, self.pending
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoZQuality {
    pub n: usize,
    pub bias: f64,
    pub std: f64,
    pub robust_std: f64,
    pub outlier_cut: f64,
    pub outlier_fraction: f64,
}

impl PhotoZQuality {
    /// Statistics over `(z_true, z_phot)` pairs; `None` when there are no pairs.
    pub fn from_pairs<I: IntoIterator<Item = (Redshift, Redshift)>>(pairs: I) -> Option<Self> {
        let mut dz: Vec<f64> = pairs
            .into_iter()
            .map(|(z_true, z_phot)| (z_phot - z_true) / (1.0 + z_true))
            .collect();
        if dz.is_empty() {
            return None;
        }

        let n = dz.len();
        let bias = dz.iter().sum::<f64>() / n as f64;
        let std = (dz.iter().map(|d| (d - bias).powi(2)).sum::<f64>() / n as f64).sqrt();

        dz.sort_unstable_by(f64::total_cmp);
        let iqr = quantile_sorted(&dz, 0.75) - quantile_sorted(&dz, 0.25);
        let robust_std = iqr / IQR_TO_SIGMA;

        let outlier_cut = MIN_OUTLIER_CUT.max(3.0 * robust_std);
        let n_outliers = dz.iter().filter(|d| d.abs() > outlier_cut).count();

        Some(PhotoZQuality {
            n,
            bias,
            std,
            robust_std,
            outlier_cut,
            outlier_fraction: n_outliers as f64 / n as f64,
        })
    }
}

/// Linear-interpolation quantile of sorted, non-empty data.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl fmt::Display for PhotoZQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Photo-z quality (Δz/(1+z))")?;
            writeln!(f, "--------------------------")?;
            writeln!(f, "n          : {}", self.n)?;
            writeln!(f, "bias       : {:+.4}", self.bias)?;
            writeln!(f, "std        : {:.4}", self.std)?;
            writeln!(f, "robust std : {:.4}", self.robust_std)?;
            write!(
                f,
                "outliers   : {:.2}% (|Δz/(1+z)| > {:.3})",
                100.0 * self.outlier_fraction,
                self.outlier_cut
            )
        } else {
            write!(
                f,
                "n={}, bias={:+.4}, std={:.4}, robust_std={:.4}, outliers={:.2}%",
                self.n,
                self.bias,
                self.std,
                self.robust_std,
                100.0 * self.outlier_fraction
            )
        }
    }
}
