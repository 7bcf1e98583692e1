//! χ² threshold table indexed by degrees of freedom.
//!
//! Entry `d` is the value `x` with `P(χ²_d ≤ x) = p`. Entry `0` is exactly `0`: a comparison
//! without any shared color admits no valid distance, and the subset selector rejects
//! pairs whose threshold is not strictly positive.
//!
//! The statrs inverse CDF loses accuracy in the far lower tail (it yields `NaN` at one degree
//! of freedom for `p ≲ 0.02`). Every entry is therefore checked against the forward CDF and,
//! when off, re-solved by bisection on `cdf` over a doubling bracket.
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::cmnn_errors::CmnnError;

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    confidence_probability: f64,
    thresholds: Vec<f64>,
}

impl ThresholdTable {
    /// Build the table for degrees of freedom `0..=k_max`.
    ///
    /// Return
    /// ----------
    /// * `Err(CmnnError::InvalidConfidenceProbability)` if `p` is not in the open interval `(0, 1)`.
    /// * `Err(CmnnError::InvalidParameter)` if a quantile cannot be resolved to a finite value.
    pub fn new(confidence_probability: f64, k_max: usize) -> Result<Self, CmnnError> {
        let p = confidence_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(CmnnError::InvalidConfidenceProbability(p));
        }

        let mut thresholds = Vec::with_capacity(k_max + 1);
        thresholds.push(0.0);
        for dof in 1..=k_max {
            let chi2 = ChiSquared::new(dof as f64).map_err(|e| {
                CmnnError::InvalidParameter(format!("chi-square with {dof} dof: {e}"))
            })?;
            let x = chi2_quantile(&chi2, dof, p).ok_or_else(|| {
                CmnnError::InvalidParameter(format!(
                    "no finite chi-square quantile for p={p} with {dof} dof"
                ))
            })?;
            thresholds.push(x);
        }

        Ok(ThresholdTable {
            confidence_probability: p,
            thresholds,
        })
    }

    /// Threshold for `dof` degrees of freedom; `0.0` beyond the table (never qualifies).
    #[inline]
    pub fn get(&self, dof: usize) -> f64 {
        self.thresholds.get(dof).copied().unwrap_or(0.0)
    }

    pub fn confidence_probability(&self) -> f64 {
        self.confidence_probability
    }

    pub fn k_max(&self) -> usize {
        self.thresholds.len() - 1
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.thresholds
    }
}

/// Relative tolerance on `cdf(x)` against the target tail mass `min(p, 1 − p)`.
const QUANTILE_TOLERANCE: f64 = 1e-6;

fn quantile_ok(chi2: &ChiSquared, x: f64, p: f64) -> bool {
    x.is_finite()
        && x >= 0.0
        && (chi2.cdf(x) - p).abs() <= QUANTILE_TOLERANCE * p.min(1.0 - p)
}

/// p-quantile of `chi2`, falling back to bisection when the closed-form inverse is off.
fn chi2_quantile(chi2: &ChiSquared, dof: usize, p: f64) -> Option<f64> {
    let guess = chi2.inverse_cdf(p);
    if quantile_ok(chi2, guess, p) {
        return Some(guess);
    }

    let mut hi = dof as f64;
    while chi2.cdf(hi) < p {
        hi *= 2.0;
        if !hi.is_finite() {
            return None;
        }
    }

    // cdf(lo) < p ≤ cdf(hi); stop once the bracket is two adjacent doubles
    let mut lo = 0.0_f64;
    for _ in 0..2_100 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if chi2.cdf(mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    quantile_ok(chi2, hi, p).then_some(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_COLORS;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_quantiles() {
        let table = ThresholdTable::new(0.68, 6).unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(table.k_max(), 6);
        assert_eq!(table.get(0), 0.0);
        assert_relative_eq!(table.get(1), 0.988946, epsilon = 1e-4);
        assert_relative_eq!(table.get(2), 2.278869, epsilon = 1e-4);
        assert_relative_eq!(table.get(5), 5.860802, epsilon = 1e-4);

        let table = ThresholdTable::new(0.95, 3).unwrap();
        assert_relative_eq!(table.get(1), 3.841459, epsilon = 1e-4);
        assert_relative_eq!(table.get(3), 7.814728, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_dof_and_monotonic() {
        for p in [1e-6, 1e-4, 1e-3, 0.01, 0.02, 0.05, 0.5, 0.68, 0.95, 0.999] {
            let table = ThresholdTable::new(p, MAX_COLORS).unwrap();
            assert_eq!(table.get(0), 0.0);
            for (dof, &x) in table.as_slice().iter().enumerate().skip(1) {
                assert!(x.is_finite() && x > 0.0, "p={p}, dof={dof}: {x}");
                let cdf = ChiSquared::new(dof as f64).unwrap().cdf(x);
                assert_relative_eq!(cdf, p, max_relative = 1e-5);
            }
            for w in table.as_slice().windows(2) {
                assert!(w[1] >= w[0], "p={p}: {:?}", table.as_slice());
            }
        }
    }

    #[test]
    fn test_low_tail_one_dof() {
        // P(χ²_1 ≤ x) = erf(√(x/2)) ≈ √(2x/π) for small x
        let table = ThresholdTable::new(1e-3, 1).unwrap();
        let expected = std::f64::consts::PI / 2.0 * 1e-6;
        assert_relative_eq!(table.get(1), expected, max_relative = 1e-3);
    }

    #[test]
    fn test_out_of_range_dof() {
        let table = ThresholdTable::new(0.68, 2).unwrap();
        assert_eq!(table.get(3), 0.0);
    }

    #[test]
    fn test_rejects_invalid_probability() {
        for bad in [0.0, 1.0, -1.0, 2.0, f64::NAN] {
            assert!(matches!(
                ThresholdTable::new(bad, 5),
                Err(CmnnError::InvalidConfidenceProbability(_))
            ));
        }
    }

    #[test]
    fn test_k_max_zero() {
        let table = ThresholdTable::new(0.68, 0).unwrap();
        assert_eq!(table.as_slice(), &[0.0]);
    }
}
