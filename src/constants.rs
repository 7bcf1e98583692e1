//! Crate-wide constants and type aliases.

/// Redshift value (dimensionless).
pub type Redshift = f64;

/// AB magnitude.
pub type Magnitude = f64;

/// Default confidence level used to build the χ² threshold table.
pub const DEFAULT_CONFIDENCE_PROBABILITY: f64 = 0.68;

/// Largest supported number of colors per galaxy (width of [`ColorMask`](crate::galaxy::ColorMask)).
pub const MAX_COLORS: usize = 64;

/// Distance assigned to the query galaxy against itself during subset selection.
///
/// Larger than any finite threshold, so the query can never qualify as its own neighbor.
pub const SELF_EXCLUSION_DISTANCE: f64 = f64::MAX;

/// AB zero point for fluxes expressed in nanojansky.
pub const AB_ZERO_POINT_NJY: f64 = 31.4;

/// Rubin/LSST filter set, bluest first.
pub const LSST_BANDS: [&str; 6] = ["u", "g", "r", "i", "z", "y"];

/// Floor of the outlier cut on |Δz|/(1+z): a galaxy is an outlier when its
/// normalized residual exceeds `max(MIN_OUTLIER_CUT, 3 σ_IQR)`.
pub const MIN_OUTLIER_CUT: f64 = 0.06;

/// Conversion factor from interquartile range to Gaussian standard deviation.
pub const IQR_TO_SIGMA: f64 = 1.349;
