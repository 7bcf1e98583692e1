//! # Leave-one-out CMNN evaluation
//!
//! Each galaxy of a [`Sample`](crate::galaxy::Sample) is treated once as the query while the
//! full sample (query excluded by the subset selector) serves as the training set.
//!
//! Modules
//! -----------------
//! * [`loo_fit`](crate::leave_one_out::loo_fit) – [`LeaveOneOutFit`](crate::leave_one_out::loo_fit::LeaveOneOutFit)
//!   driver trait on `Sample` (sequential, parallel, cancellable) and the per-query
//!   [`CmnnEstimator`](crate::leave_one_out::loo_fit::CmnnEstimator).
//! * [`loo_stats`](crate::leave_one_out::loo_stats) – outcome counts and photo-z quality statistics.
//! * [`progress_bar`](crate::leave_one_out::progress_bar) – iteration timing and, with the
//!   `progress` feature, a live progress bar.
//!
//! Result model
//! -----------------
//! Results are an index-addressed arena of [`PhotoZOutcome`], one slot per galaxy in sample
//! order, regardless of the order in which the work was executed. Each worker owns exactly one
//! slot, so no locking is involved. Write the outcomes back into the sample with
//! [`Sample::apply_photoz`](crate::galaxy::Sample::apply_photoz).
//!
//! Randomness
//! -----------------
//! * Sequential entry points consume **one caller-provided RNG stream** in ascending galaxy
//!   order, one draw per galaxy with a non-empty subset.
//! * Parallel entry points give galaxy `i` its own `StdRng` seeded with `seed + i`
//!   (wrapping). Results are reproducible for a seed and independent of the thread count, but
//!   differ from the sequential stream.
//!
//! Self-similarity caveat
//! -----------------
//! Only the query itself and exact color duplicates (`D = 0`) are excluded from its subset.
//! Near-duplicates of the query remain eligible, which can make leave-one-out accuracy look
//! slightly better than on a truly independent test set.
use crate::cmnn::photoz_result::PhotoZOutcome;
use crate::constants::Redshift;

pub mod loo_fit;
pub mod loo_stats;
pub mod progress_bar;

use loo_stats::{LooSummary, PhotoZQuality};

/// Per-galaxy leave-one-out outcomes, in sample order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LooResults {
    outcomes: Vec<PhotoZOutcome>,
}

impl LooResults {
    pub fn from_outcomes(outcomes: Vec<PhotoZOutcome>) -> Self {
        LooResults { outcomes }
    }

    /// All slots `Pending`.
    pub fn pending(len: usize) -> Self {
        LooResults {
            outcomes: vec![PhotoZOutcome::Pending; len],
        }
    }

    pub fn outcomes(&self) -> &[PhotoZOutcome] {
        &self.outcomes
    }

    pub fn get(&self, index: usize) -> Option<&PhotoZOutcome> {
        self.outcomes.get(index)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Point estimates, `None` where no estimate exists.
    pub fn photo_z(&self) -> Vec<Option<Redshift>> {
        self.outcomes.iter().map(PhotoZOutcome::photo_z).collect()
    }

    /// Uncertainties, `None` where no estimate exists.
    pub fn photo_z_err(&self) -> Vec<Option<f64>> {
        self.outcomes.iter().map(PhotoZOutcome::photo_z_err).collect()
    }

    /// Counts of estimated, unmatched, and pending galaxies.
    pub fn summary(&self) -> LooSummary {
        LooSummary::from_outcomes(&self.outcomes)
    }

    /// Accuracy of the estimates against the true redshifts (same order as the results).
    pub fn quality(&self, true_redshifts: &[Redshift]) -> Option<PhotoZQuality> {
        PhotoZQuality::from_pairs(
            self.outcomes
                .iter()
                .zip(true_redshifts)
                .filter_map(|(o, &z)| o.photo_z().map(|pz| (z, pz))),
        )
    }
}
