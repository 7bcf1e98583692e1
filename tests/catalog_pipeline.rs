mod common;

use camino::Utf8Path;
use cmnn::galaxy::catalog_reader::{read_catalog, CatalogColumns};
use cmnn::galaxy::catalog_writer::write_photoz_to_writer;
use cmnn::{CmnnEstimator, CmnnParams, LeaveOneOutFit, LooSummary, PhotoZOutcome};
use rand::{rngs::StdRng, SeedableRng};

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/mini_catalog.csv");

fn in_range(z: Option<f64>, lo: f64, hi: f64) -> bool {
    z.is_some_and(|z| (lo..=hi).contains(&z))
}

#[test]
fn test_catalog_loo_recovers_clusters() {
    let mut sample = read_catalog(Utf8Path::new(CATALOG), &CatalogColumns::default()).unwrap();
    assert_eq!(sample.len(), 10);
    assert_eq!(sample.n_colors(), 5);
    // missing r band removes the g-r and r-i colors
    assert_eq!(sample.galaxies()[8].color_mask().count(), 3);

    let params = CmnnParams::builder().min_valid_colors(3).build().unwrap();
    let estimator = CmnnEstimator::new(&sample, &params).unwrap();
    assert_eq!(estimator.leave_one_out_subset(8), vec![0, 1, 2, 3]);
    assert!(estimator.leave_one_out_subset(9).is_empty());

    let results = sample
        .estimate_all_photoz(&params, &mut StdRng::seed_from_u64(2024))
        .unwrap();
    let out = results.outcomes();

    for (i, o) in out.iter().enumerate().take(4) {
        assert!(in_range(o.photo_z(), 0.28, 0.32), "galaxy {i}: {o:?}");
    }
    for (i, o) in out.iter().enumerate().skip(4).take(4) {
        assert!(in_range(o.photo_z(), 1.18, 1.25), "galaxy {i}: {o:?}");
    }
    assert!(in_range(out[8].photo_z(), 0.28, 0.32));
    assert_eq!(out[9], PhotoZOutcome::NoMatch);

    assert_eq!(
        results.summary(),
        LooSummary {
            total: 10,
            estimated: 9,
            no_match: 1,
            pending: 0
        }
    );

    sample.apply_photoz(&results);
    assert_eq!(sample.galaxies()[9].photo_z(), None);
    assert_eq!(sample.galaxies()[0].photo_z(), out[0].photo_z());
}

#[test]
fn test_all_colors_required_drops_incomplete_galaxy() {
    let sample = read_catalog(Utf8Path::new(CATALOG), &CatalogColumns::default()).unwrap();
    let results = sample.estimate_all_photoz_parallel(&CmnnParams::default(), 5).unwrap();

    let out = results.outcomes();
    assert_eq!(out[8], PhotoZOutcome::NoMatch);
    assert_eq!(out[9], PhotoZOutcome::NoMatch);
    assert!(out[..8].iter().all(PhotoZOutcome::is_estimated));
    // cluster members never see galaxy 8, so every subset has exactly three members
    assert!(out[..8].iter().all(|o| o.n_neighbors() == 3));
}

#[test]
fn test_catalog_photoz_export() {
    let sample = read_catalog(Utf8Path::new(CATALOG), &CatalogColumns::default()).unwrap();
    let params = CmnnParams::builder().min_valid_colors(3).build().unwrap();
    let results = sample.estimate_all_photoz_parallel(&params, 1).unwrap();

    let mut buf = Vec::new();
    write_photoz_to_writer(&mut buf, &sample, &results).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "index,redshift,photo_z,photo_z_err,n_neighbors,status");
    assert!(lines[1..10].iter().all(|l| l.ends_with(",estimated")));
    assert_eq!(lines[10], "9,2.5,,,0,no_match");
}

#[test]
fn test_missing_column_reported() {
    let columns = CatalogColumns::for_bands(&["u", "g", "w"]);
    assert!(read_catalog(Utf8Path::new(CATALOG), &columns).is_err());
}
