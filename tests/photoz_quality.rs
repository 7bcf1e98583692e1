mod common;

use cmnn::{CmnnParams, LeaveOneOutFit};

#[test]
fn test_complete_photometry_quality() {
    let sample = common::synthetic_sample(400, 21, 0.0);
    let results = sample
        .estimate_all_photoz_parallel(&CmnnParams::default(), 99)
        .unwrap();

    let summary = results.summary();
    assert_eq!(summary.pending, 0);
    assert!(summary.estimated as f64 / summary.total as f64 > 0.8, "{summary}");

    let quality = results.quality(sample.redshifts()).unwrap();
    assert_eq!(quality.n, summary.estimated);
    assert!(quality.robust_std < 0.2, "{quality}");
    assert!(quality.bias.abs() < 0.1, "{quality}");
}

#[test]
fn test_quality_with_dropped_bands() {
    let sample = common::synthetic_sample(400, 22, 0.15);
    let params = CmnnParams::builder().min_valid_colors(3).build().unwrap();
    let results = sample.estimate_all_photoz_parallel(&params, 5).unwrap();

    let summary = results.summary();
    assert!(summary.estimated as f64 / summary.total as f64 > 0.6, "{summary}");

    let quality = results.quality(sample.redshifts()).unwrap();
    assert!(quality.robust_std < 0.3, "{quality}");
}
