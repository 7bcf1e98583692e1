//! # Color-Matched Nearest-Neighbor (CMNN) parameters and components
//!
//! This module defines the [`CmnnParams`](crate::cmnn::CmnnParams) configuration struct and its
//! builder, together with the four per-query components of the CMNN photo-z estimator.
//!
//! ## Pipeline overview
//!
//! For one query galaxy `q` against a reference set `R`:
//!
//! 1. **Threshold table** ([`threshold`](crate::cmnn::threshold))
//!    The χ² quantile at `confidence_probability` for every possible number of degrees of
//!    freedom `0..=K`, built once per run.
//!
//! 2. **Pairwise color distance** ([`color_distance`](crate::cmnn::color_distance))
//!    `D(q,r) = Σ (c_q − c_r)² / σ_q²` over dimensions valid for the pair, together with the
//!    count `d(q,r)` of such dimensions.
//!
//! 3. **Subset selection** ([`subset`](crate::cmnn::subset))
//!    Self-exclusion, `d ≥ min_valid_colors`, `0 < D ≤ threshold(d)`.
//!
//! 4. **Estimation** ([`photoz_result`](crate::cmnn::photoz_result))
//!    One uniformly drawn subset member gives the photo-z; the standard deviation of the
//!    subset's redshifts gives its uncertainty.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cmnn::cmnn::CmnnParams;
//!
//! let params = CmnnParams::builder()
//!     .confidence_probability(0.95)
//!     .min_valid_colors(3)
//!     .sample_limit(10_000)
//!     .build()
//!     .unwrap();
//! println!("{params:#}");
//! ```
//!
//! ## See also
//!
//! * [`LeaveOneOutFit`](crate::leave_one_out::loo_fit::LeaveOneOutFit) – batch driver consuming these parameters.
use std::fmt;

use crate::{cmnn_errors::CmnnError, constants::DEFAULT_CONFIDENCE_PROBABILITY};

pub mod color_distance;
pub mod photoz_result;
pub mod subset;
pub mod threshold;

/// Configuration of a CMNN leave-one-out run.
///
/// Fields
/// -----------------
/// * `confidence_probability` – confidence level `p ∈ (0, 1)` of the χ² threshold.
///   Larger values admit more (and less well matched) neighbors.
/// * `min_valid_colors` – minimum number of colors a query/reference pair must share.
///   `None` means "all `K` colors", resolved against the sample at run start.
/// * `sample_limit` – optional cap on the number of **query** galaxies processed (the first
///   `N` in sample order). The reference set always spans the full sample.
///
/// Defaults
/// -----------------
/// * `confidence_probability`: 0.68
/// * `min_valid_colors`: `None` (= `K`)
/// * `sample_limit`: `None`
///
/// Validation
/// -----------------
/// * `0 < confidence_probability < 1` (checked by [`CmnnParamsBuilder::build`]).
/// * `1 ≤ min_valid_colors` (builder) and `min_valid_colors ≤ K`
///   (checked by [`CmnnParams::resolve_min_valid_colors`]).
/// * `sample_limit ≥ 1` when given.
#[derive(Debug, Clone, PartialEq)]
pub struct CmnnParams {
    pub confidence_probability: f64,
    pub min_valid_colors: Option<usize>,
    pub sample_limit: Option<usize>,
}

impl CmnnParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`CmnnParamsBuilder`] initialized with defaults.
    pub fn builder() -> CmnnParamsBuilder {
        CmnnParamsBuilder::new()
    }

    /// Effective minimum number of shared colors for a sample with `n_colors` colors.
    ///
    /// Return
    /// ----------
    /// * `Ok(n_colors)` when `min_valid_colors` is `None`.
    /// * `Err(CmnnError::InvalidMinValidColors)` if the value lies outside `[1, n_colors]`.
    pub fn resolve_min_valid_colors(&self, n_colors: usize) -> Result<usize, CmnnError> {
        let min_valid_colors = self.min_valid_colors.unwrap_or(n_colors);
        if min_valid_colors == 0 || min_valid_colors > n_colors {
            return Err(CmnnError::InvalidMinValidColors {
                min_valid_colors,
                n_colors,
            });
        }
        Ok(min_valid_colors)
    }

    /// Number of query galaxies to process for a sample of `sample_len` galaxies.
    pub fn n_queries(&self, sample_len: usize) -> usize {
        self.sample_limit
            .map_or(sample_len, |limit| limit.min(sample_len))
    }

    fn check_confidence_probability(p: f64) -> Result<(), CmnnError> {
        if p > 0.0 && p < 1.0 {
            Ok(())
        } else {
            Err(CmnnError::InvalidConfidenceProbability(p))
        }
    }
}

impl Default for CmnnParams {
    fn default() -> Self {
        CmnnParams {
            confidence_probability: DEFAULT_CONFIDENCE_PROBABILITY,
            min_valid_colors: None,
            sample_limit: None,
        }
    }
}

/// Builder for [`CmnnParams`], with validation.
#[derive(Debug, Clone)]
pub struct CmnnParamsBuilder {
    params: CmnnParams,
}

impl Default for CmnnParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CmnnParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: CmnnParams::default(),
        }
    }

    pub fn confidence_probability(mut self, v: f64) -> Self {
        self.params.confidence_probability = v;
        self
    }
    pub fn min_valid_colors(mut self, v: usize) -> Self {
        self.params.min_valid_colors = Some(v);
        self
    }
    pub fn sample_limit(mut self, v: usize) -> Self {
        self.params.sample_limit = Some(v);
        self
    }

    /// Validate and return the parameters.
    ///
    /// `min_valid_colors ≤ K` can only be checked once the sample is known; see
    /// [`CmnnParams::resolve_min_valid_colors`].
    pub fn build(self) -> Result<CmnnParams, CmnnError> {
        let p = &self.params;

        CmnnParams::check_confidence_probability(p.confidence_probability)?;

        if p.min_valid_colors == Some(0) {
            return Err(CmnnError::InvalidMinValidColors {
                min_valid_colors: 0,
                n_colors: crate::constants::MAX_COLORS,
            });
        }
        if p.sample_limit == Some(0) {
            return Err(CmnnError::InvalidParameter(
                "sample_limit must be >= 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for CmnnParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_colors = self
            .min_valid_colors
            .map_or_else(|| "all".to_string(), |v| v.to_string());
        let limit = self
            .sample_limit
            .map_or_else(|| "none".to_string(), |v| v.to_string());

        if f.alternate() {
            const PARAM_COL: usize = 36;
            writeln!(f, "CMNN Parameters")?;
            writeln!(f, "---------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!(
                "confidence_probability = {:.3}",
                self.confidence_probability,
                "chi-square threshold confidence level"
            )?;
            line!(
                "min_valid_colors       = {}",
                min_colors,
                "Minimum colors shared by a pair"
            )?;
            line!(
                "sample_limit           = {}",
                limit,
                "Cap on query galaxies"
            )?;
            Ok(())
        } else {
            write!(
                f,
                "CmnnParams(p={:.3}, min_valid_colors={}, sample_limit={})",
                self.confidence_probability, min_colors, limit
            )
        }
    }
}
