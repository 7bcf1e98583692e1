//! Color-Matched Nearest-Neighbor (CMNN) photometric redshifts.
//!
//! A galaxy's photo-z is drawn from the training galaxies whose colors match its own within
//! a χ² confidence threshold, using only the colors both galaxies actually measured. The
//! estimator is evaluated by leave-one-out cross-validation over a single sample.
//!
//! * [`galaxy`] – sample data model, photometry, catalog I/O, synthetic noise.
//! * [`cmnn`] – parameters, threshold table, color distance, subset selection, estimation.
//! * [`leave_one_out`] – sequential and parallel drivers, summaries, quality statistics.
pub mod cmnn;
pub mod cmnn_errors;
pub mod constants;
pub mod galaxy;
pub mod leave_one_out;

pub use cmnn::{photoz_result::PhotoZOutcome, threshold::ThresholdTable, CmnnParams};
pub use cmnn_errors::CmnnError;
pub use galaxy::{ColorMask, Galaxy, Sample};
pub use leave_one_out::{
    loo_fit::{CmnnEstimator, LeaveOneOutFit},
    loo_stats::{LooSummary, PhotoZQuality},
    LooResults,
};
