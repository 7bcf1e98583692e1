mod common;

use std::sync::atomic::AtomicBool;

use cmnn::leave_one_out::loo_fit::galaxy_seed;
use cmnn::{CmnnEstimator, CmnnParams, LeaveOneOutFit, PhotoZOutcome};
use rand::{rngs::StdRng, SeedableRng};

fn params() -> CmnnParams {
    CmnnParams::builder()
        .confidence_probability(0.68)
        .min_valid_colors(3)
        .build()
        .unwrap()
}

#[test]
fn test_sequential_same_seed_same_results() {
    let sample = common::synthetic_sample(120, 11, 0.05);

    let a = sample
        .estimate_all_photoz(&params(), &mut StdRng::seed_from_u64(5))
        .unwrap();
    let b = sample
        .estimate_all_photoz(&params(), &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.summary().pending, 0);
}

#[test]
fn test_parallel_matches_per_galaxy_seeding() {
    let sample = common::synthetic_sample(120, 12, 0.05);
    let seed = 77;

    let par = sample.estimate_all_photoz_parallel(&params(), seed).unwrap();
    assert_eq!(par, sample.estimate_all_photoz_parallel(&params(), seed).unwrap());

    let estimator = CmnnEstimator::new(&sample, &params()).unwrap();
    for (i, outcome) in par.outcomes().iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(galaxy_seed(seed, i));
        assert_eq!(*outcome, estimator.estimate_leave_one_out(i, &mut rng));
    }
}

#[test]
fn test_parallel_independent_of_thread_count() {
    let sample = common::synthetic_sample(80, 13, 0.0);
    let many = sample.estimate_all_photoz_parallel(&params(), 3).unwrap();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let single = pool.install(|| sample.estimate_all_photoz_parallel(&params(), 3).unwrap());

    assert_eq!(many, single);
}

#[test]
fn test_subsets_do_not_depend_on_seed() {
    let sample = common::synthetic_sample(60, 14, 0.0);

    let a = sample.estimate_all_photoz_parallel(&params(), 1).unwrap();
    let b = sample.estimate_all_photoz_parallel(&params(), 2).unwrap();

    for (x, y) in a.outcomes().iter().zip(b.outcomes()) {
        assert_eq!(x.is_estimated(), y.is_estimated());
        assert_eq!(x.n_neighbors(), y.n_neighbors());
        assert_eq!(x.photo_z_err(), y.photo_z_err());
    }
}

#[test]
fn test_sequential_cancel_keeps_completed_prefix() {
    let sample = common::synthetic_sample(30, 15, 0.0);
    let full = sample
        .estimate_all_photoz(&params(), &mut StdRng::seed_from_u64(8))
        .unwrap();

    let mut calls = 0;
    let partial = sample
        .estimate_all_photoz_with_cancel(&params(), &mut StdRng::seed_from_u64(8), || {
            calls += 1;
            calls > 5
        })
        .unwrap();

    assert_eq!(partial.len(), sample.len());
    assert_eq!(partial.outcomes()[..5], full.outcomes()[..5]);
    assert!(partial.outcomes()[5..].iter().all(PhotoZOutcome::is_pending));
    assert_eq!(partial.summary().pending, sample.len() - 5);
}

#[test]
fn test_parallel_cancel_before_start_leaves_everything_pending() {
    let sample = common::synthetic_sample(30, 16, 0.0);
    let cancel = AtomicBool::new(true);

    let results = sample
        .estimate_all_photoz_parallel_with_cancel(&params(), 0, &cancel)
        .unwrap();

    assert_eq!(results.len(), sample.len());
    assert_eq!(results.summary().pending, sample.len());
}
