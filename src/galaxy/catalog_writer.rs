//! CSV export of leave-one-out photo-z outputs.
//!
//! One row per galaxy, in sample order:
//!
//! ```text
//! index,redshift,photo_z,photo_z_err,n_neighbors,status
//! ```
//!
//! `photo_z` and `photo_z_err` are left empty when no estimate exists.
use std::{fs::File, io::Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::{
    cmnn::photoz_result::PhotoZOutcome, cmnn_errors::CmnnError, galaxy::Sample,
    leave_one_out::LooResults,
};

#[derive(Debug, Serialize)]
struct PhotoZRecord {
    index: usize,
    redshift: f64,
    photo_z: Option<f64>,
    photo_z_err: Option<f64>,
    n_neighbors: usize,
    status: &'static str,
}

/// Write `results` next to the true redshifts of `sample` into a CSV file.
pub fn write_photoz(
    path: &Utf8Path,
    sample: &Sample,
    results: &LooResults,
) -> Result<(), CmnnError> {
    let file = File::create(path)?;
    write_photoz_to_writer(file, sample, results)
}

/// Same as [`write_photoz`] for any byte sink.
pub fn write_photoz_to_writer<W: Write>(
    writer: W,
    sample: &Sample,
    results: &LooResults,
) -> Result<(), CmnnError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for (index, (z, outcome)) in sample
        .redshifts()
        .iter()
        .zip(results.outcomes())
        .enumerate()
    {
        csv_writer.serialize(PhotoZRecord {
            index,
            redshift: *z,
            photo_z: outcome.photo_z(),
            photo_z_err: outcome.photo_z_err(),
            n_neighbors: outcome.n_neighbors(),
            status: status_label(outcome),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn status_label(outcome: &PhotoZOutcome) -> &'static str {
    match outcome {
        PhotoZOutcome::Pending => "pending",
        PhotoZOutcome::Estimated { .. } => "estimated",
        PhotoZOutcome::NoMatch => "no_match",
    }
}
