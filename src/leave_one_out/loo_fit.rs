//! # Batch CMNN photo-z over a galaxy sample
//!
//! Run the CMNN estimator in **leave-one-out** mode over a [`Sample`]: every galaxy is the
//! query once, the whole sample is the training set, and the per-galaxy outcomes are
//! collected into [`LooResults`] in sample order.
//!
//! ## Overview
//! -----------------
//! [`CmnnEstimator`] holds everything that is shared across queries (the training sample,
//! the χ² [`ThresholdTable`], the resolved minimum number of shared colors). The
//! [`LeaveOneOutFit`] trait, implemented on [`Sample`], drives it:
//!
//! * `estimate_all_photoz` – sequential, one RNG stream,
//! * `estimate_all_photoz_with_cancel` – same, with **cooperative cancellation**,
//! * `estimate_all_photoz_parallel` – data-parallel on the rayon pool, per-galaxy seeded RNG,
//! * `estimate_all_photoz_parallel_with_cancel` – same, stopped through an [`AtomicBool`].
//!
//! ## Error Semantics
//! -----------------
//! * Configuration errors (confidence probability, `min_valid_colors` outside `[1, K]`)
//!   are returned **before** any galaxy is processed.
//! * A galaxy without color-matched neighbors is recorded as
//!   [`PhotoZOutcome::NoMatch`]; it never aborts the run.
//!
//! ## Cancellation
//! -----------------
//! The stop condition is checked before each galaxy. Galaxies already processed keep their
//! outcome, the rest stay [`PhotoZOutcome::Pending`]. Every outcome depends only on the
//! sample and on its own random draw, so a cancelled run can be resumed or recomputed
//! without affecting completed slots.
//!
//! ## Examples
//! -----------------
//! ```rust,no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use cmnn::cmnn::CmnnParams;
//! use cmnn::galaxy::Sample;
//! use cmnn::leave_one_out::loo_fit::LeaveOneOutFit;
//!
//! # fn demo(mut sample: Sample) -> Result<(), cmnn::cmnn_errors::CmnnError> {
//! let params = CmnnParams::builder().confidence_probability(0.68).build()?;
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let results = sample.estimate_all_photoz(&params, &mut rng)?;
//! eprintln!("{:#}", results.summary());
//! if let Some(quality) = results.quality(sample.redshifts()) {
//!     eprintln!("{quality:#}");
//! }
//! sample.apply_photoz(&results);
//! # Ok(()) }
//! ```
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::{
    cmnn::{
        color_distance::color_distances,
        photoz_result::{estimate_from_subset, PhotoZOutcome},
        subset::select_cmnn_subset,
        threshold::ThresholdTable,
        CmnnParams,
    },
    cmnn_errors::CmnnError,
    galaxy::{Galaxy, Sample},
};

use super::{
    progress_bar::{fmt_dur, IterTimer, LooProgress},
    LooResults,
};

/// CMNN estimator bound to a training sample and a validated configuration.
#[derive(Debug, Clone)]
pub struct CmnnEstimator<'a> {
    training: &'a Sample,
    thresholds: ThresholdTable,
    min_dof: usize,
    n_queries: usize,
}

impl<'a> CmnnEstimator<'a> {
    /// Validate `params` against `training` and precompute the threshold table.
    ///
    /// Return
    /// ----------
    /// * `Err(CmnnError::InvalidConfidenceProbability)` for `p ∉ (0, 1)`.
    /// * `Err(CmnnError::InvalidMinValidColors)` for `min_valid_colors ∉ [1, K]`.
    pub fn new(training: &'a Sample, params: &CmnnParams) -> Result<Self, CmnnError> {
        if training.is_empty() {
            return Err(CmnnError::EmptySample);
        }
        let n_colors = training.n_colors();
        let min_dof = params.resolve_min_valid_colors(n_colors)?;
        let thresholds = ThresholdTable::new(params.confidence_probability, n_colors)?;

        Ok(CmnnEstimator {
            training,
            thresholds,
            min_dof,
            n_queries: params.n_queries(training.len()),
        })
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn min_dof(&self) -> usize {
        self.min_dof
    }

    /// Number of query galaxies processed by a full leave-one-out pass.
    pub fn n_queries(&self) -> usize {
        self.n_queries
    }

    /// Indices of the training galaxies color-matched to training galaxy `query_index`.
    pub fn leave_one_out_subset(&self, query_index: usize) -> Vec<usize> {
        let galaxies = self.training.galaxies();
        let mut pairs = color_distances(&galaxies[query_index], galaxies);
        select_cmnn_subset(Some(query_index), &mut pairs, &self.thresholds, self.min_dof)
    }

    /// Photo-z of training galaxy `query_index`, with itself excluded from the training set.
    pub fn estimate_leave_one_out(&self, query_index: usize, rng: &mut impl Rng) -> PhotoZOutcome {
        let subset = self.leave_one_out_subset(query_index);
        estimate_from_subset(&subset, self.training.redshifts(), rng)
    }

    /// Photo-z of a galaxy that is not part of the training sample.
    ///
    /// Return
    /// ----------
    /// * `Err(CmnnError::InconsistentDimensionality)` if the query's color count differs from
    ///   the training sample's.
    pub fn estimate(&self, query: &Galaxy, rng: &mut impl Rng) -> Result<PhotoZOutcome, CmnnError> {
        if query.n_colors() != self.training.n_colors() {
            return Err(CmnnError::InconsistentDimensionality {
                index: 0,
                expected: self.training.n_colors(),
                found: query.n_colors(),
            });
        }
        let mut pairs = color_distances(query, self.training.galaxies());
        let subset = select_cmnn_subset(None, &mut pairs, &self.thresholds, self.min_dof);
        Ok(estimate_from_subset(&subset, self.training.redshifts(), rng))
    }
}

/// Seed of the per-galaxy RNG used by the parallel entry points.
#[inline]
pub fn galaxy_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add(index as u64)
}

pub trait LeaveOneOutFit {
    /// Leave-one-out photo-z for every galaxy, sequentially.
    ///
    /// Arguments
    /// -----------------
    /// * `params`: validated CMNN configuration.
    /// * `rng`: single random stream, consumed in ascending galaxy order with exactly one
    ///   draw per galaxy whose subset is non-empty.
    ///
    /// Return
    /// ----------
    /// * One [`PhotoZOutcome`] per galaxy in sample order (galaxies past `sample_limit`
    ///   stay `Pending`), or a configuration error.
    fn estimate_all_photoz(
        &self,
        params: &CmnnParams,
        rng: &mut impl Rng,
    ) -> Result<LooResults, CmnnError>;

    /// Sequential run that calls `should_cancel()` before each galaxy and stops when it
    /// returns `true`.
    fn estimate_all_photoz_with_cancel<F>(
        &self,
        params: &CmnnParams,
        rng: &mut impl Rng,
        should_cancel: F,
    ) -> Result<LooResults, CmnnError>
    where
        F: FnMut() -> bool;

    /// Leave-one-out photo-z for every galaxy on the rayon thread pool.
    ///
    /// Galaxy `i` draws from `StdRng::seed_from_u64(seed + i)` (see [`galaxy_seed`]), so the
    /// output is reproducible for a given `seed` whatever the number of threads.
    fn estimate_all_photoz_parallel(
        &self,
        params: &CmnnParams,
        seed: u64,
    ) -> Result<LooResults, CmnnError>;

    /// Parallel run that skips every galaxy not yet started once `cancel` is set.
    fn estimate_all_photoz_parallel_with_cancel(
        &self,
        params: &CmnnParams,
        seed: u64,
        cancel: &AtomicBool,
    ) -> Result<LooResults, CmnnError>;
}

impl LeaveOneOutFit for Sample {
    fn estimate_all_photoz(
        &self,
        params: &CmnnParams,
        rng: &mut impl Rng,
    ) -> Result<LooResults, CmnnError> {
        self.estimate_all_photoz_with_cancel(params, rng, || false)
    }

    fn estimate_all_photoz_with_cancel<F>(
        &self,
        params: &CmnnParams,
        rng: &mut impl Rng,
        mut should_cancel: F,
    ) -> Result<LooResults, CmnnError>
    where
        F: FnMut() -> bool,
    {
        let estimator = CmnnEstimator::new(self, params)?;
        debug!("{params}, min_dof={}", estimator.min_dof());

        let start = Instant::now();
        let progress = LooProgress::new(estimator.n_queries());
        let mut timer = IterTimer::new(0.2);
        let mut outcomes = vec![PhotoZOutcome::Pending; self.len()];

        for (index, slot) in outcomes.iter_mut().take(estimator.n_queries()).enumerate() {
            if should_cancel() {
                progress.interrupt();
                warn!("leave-one-out cancelled after {index} galaxies");
                break;
            }

            *slot = estimator.estimate_leave_one_out(index, rng);

            timer.tick();
            progress.step(Some(&timer));
        }
        progress.finish();

        let results = LooResults::from_outcomes(outcomes);
        report(&results, start, Some(&timer));
        Ok(results)
    }

    fn estimate_all_photoz_parallel(
        &self,
        params: &CmnnParams,
        seed: u64,
    ) -> Result<LooResults, CmnnError> {
        let never = AtomicBool::new(false);
        self.estimate_all_photoz_parallel_with_cancel(params, seed, &never)
    }

    fn estimate_all_photoz_parallel_with_cancel(
        &self,
        params: &CmnnParams,
        seed: u64,
        cancel: &AtomicBool,
    ) -> Result<LooResults, CmnnError> {
        let estimator = CmnnEstimator::new(self, params)?;
        debug!(
            "{params}, min_dof={}, seed={seed}, threads={}",
            estimator.min_dof(),
            rayon::current_num_threads()
        );

        let start = Instant::now();
        let progress = LooProgress::new(estimator.n_queries());

        let mut outcomes: Vec<PhotoZOutcome> = (0..estimator.n_queries())
            .into_par_iter()
            .map(|index| {
                if cancel.load(Ordering::Relaxed) {
                    return PhotoZOutcome::Pending;
                }
                let mut rng = StdRng::seed_from_u64(galaxy_seed(seed, index));
                let outcome = estimator.estimate_leave_one_out(index, &mut rng);
                progress.step(None);
                outcome
            })
            .collect();
        outcomes.resize(self.len(), PhotoZOutcome::Pending);

        if cancel.load(Ordering::Relaxed) {
            progress.interrupt();
            warn!("parallel leave-one-out cancelled");
        }
        progress.finish();

        let results = LooResults::from_outcomes(outcomes);
        report(&results, start, None);
        Ok(results)
    }
}

fn report(results: &LooResults, start: Instant, timer: Option<&IterTimer>) {
    let summary = results.summary();
    match timer {
        Some(t) if t.count() > 0 => info!(
            "CMNN leave-one-out done in {} (avg {} per galaxy): {summary}",
            fmt_dur(start.elapsed()),
            fmt_dur(t.avg())
        ),
        _ => info!(
            "CMNN leave-one-out done in {}: {summary}",
            fmt_dur(start.elapsed())
        ),
    }
    if summary.no_match > 0 {
        warn!(
            "{} of {} processed galaxies have no color-matched neighbor ({:.1}%)",
            summary.no_match,
            summary.processed(),
            100.0 * summary.no_match_fraction()
        );
    }
}
