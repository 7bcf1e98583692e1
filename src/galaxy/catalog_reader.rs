//! # CSV catalog ingestion
//!
//! Reads a headed CSV table with one row per galaxy (per-band magnitudes, per-band
//! magnitude errors, true redshift) and builds a [`Sample`] through
//! [`Galaxy::from_magnitudes`].
//!
//! Column names are configurable through [`CatalogColumns`]; the default layout matches the
//! Rubin/LSST filter set:
//!
//! ```text
//! mag_u, mag_g, mag_r, mag_i, mag_z, mag_y, magerr_u, …, magerr_y, redshift
//! ```
//!
//! Extra columns are ignored. Empty cells and the tokens `nan` / `null` / `NA`
//! (case-insensitive) are read as missing measurements. Redshift cells must hold a finite
//! number.
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use cmnn::galaxy::catalog_reader::{read_catalog, CatalogColumns};
//!
//! let sample = read_catalog(Utf8Path::new("catalog.csv"), &CatalogColumns::default()).unwrap();
//! println!("{} galaxies, {} colors", sample.len(), sample.n_colors());
//! ```
use std::{fs::File, io::Read};

use camino::Utf8Path;
use csv::StringRecord;

use crate::{
    cmnn_errors::CmnnError,
    constants::LSST_BANDS,
    galaxy::{Galaxy, Sample},
};

/// Names of the catalog columns holding photometry and redshift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumns {
    /// Magnitude columns, bluest band first.
    pub magnitudes: Vec<String>,
    /// Magnitude-error columns, same order as `magnitudes`.
    pub magnitude_errors: Vec<String>,
    pub redshift: String,
}

impl CatalogColumns {
    /// `mag_{band}` / `magerr_{band}` columns for the given bands and a `redshift` column.
    pub fn for_bands(bands: &[&str]) -> Self {
        CatalogColumns {
            magnitudes: bands.iter().map(|b| format!("mag_{b}")).collect(),
            magnitude_errors: bands.iter().map(|b| format!("magerr_{b}")).collect(),
            redshift: "redshift".to_string(),
        }
    }
}

impl Default for CatalogColumns {
    fn default() -> Self {
        CatalogColumns::for_bands(&LSST_BANDS)
    }
}

/// Read a catalog file into a [`Sample`].
pub fn read_catalog(path: &Utf8Path, columns: &CatalogColumns) -> Result<Sample, CmnnError> {
    let file = File::open(path)?;
    read_catalog_from_reader(file, columns)
}

/// Read a catalog from any byte stream into a [`Sample`].
///
/// Return
/// ----------
/// * `Err(CmnnError::MissingColumn)` if a configured column is absent from the header.
/// * `Err(CmnnError::InvalidCatalogValue)` for unparsable cells or a missing redshift.
/// * `Err(CmnnError::EmptySample)` if the table has no data rows.
pub fn read_catalog_from_reader<R: Read>(
    reader: R,
    columns: &CatalogColumns,
) -> Result<Sample, CmnnError> {
    if columns.magnitudes.len() != columns.magnitude_errors.len() {
        return Err(CmnnError::InvalidParameter(
            "magnitude and magnitude-error column lists differ in length".into(),
        ));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let locate = |name: &String| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CmnnError::MissingColumn(name.clone()))
    };
    let mag_idx = columns
        .magnitudes
        .iter()
        .map(locate)
        .collect::<Result<Vec<_>, _>>()?;
    let err_idx = columns
        .magnitude_errors
        .iter()
        .map(locate)
        .collect::<Result<Vec<_>, _>>()?;
    let z_idx = locate(&columns.redshift)?;

    let mut galaxies = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;

        let mags = mag_idx
            .iter()
            .zip(&columns.magnitudes)
            .map(|(&i, name)| parse_optional(&record, i, name, row))
            .collect::<Result<Vec<_>, _>>()?;
        let errs = err_idx
            .iter()
            .zip(&columns.magnitude_errors)
            .map(|(&i, name)| parse_optional(&record, i, name, row))
            .collect::<Result<Vec<_>, _>>()?;

        let redshift = parse_optional(&record, z_idx, &columns.redshift, row)?.ok_or_else(|| {
            CmnnError::InvalidCatalogValue {
                column: columns.redshift.clone(),
                row,
                value: record.get(z_idx).unwrap_or_default().to_string(),
            }
        })?;

        galaxies.push(Galaxy::from_magnitudes(&mags, &errs, redshift)?);
    }

    Sample::new(galaxies)
}

fn parse_optional(
    record: &StringRecord,
    index: usize,
    column: &str,
    row: usize,
) -> Result<Option<f64>, CmnnError> {
    let cell = record.get(index).unwrap_or_default();
    if is_missing_token(cell) {
        return Ok(None);
    }
    let value: f64 = cell.parse().map_err(|_| CmnnError::InvalidCatalogValue {
        column: column.to_string(),
        row,
        value: cell.to_string(),
    })?;
    Ok(value.is_finite().then_some(value))
}

fn is_missing_token(cell: &str) -> bool {
    cell.is_empty()
        || ["nan", "null", "na", "none"]
            .iter()
            .any(|t| cell.eq_ignore_ascii_case(t))
}
