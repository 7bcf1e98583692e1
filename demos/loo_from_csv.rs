use std::env;

use camino::Utf8PathBuf;
use cmnn::cmnn_errors::CmnnError;
use cmnn::galaxy::catalog_reader::{read_catalog, CatalogColumns};
use cmnn::galaxy::catalog_writer::write_photoz;
use cmnn::{CmnnParams, LeaveOneOutFit};

/// Leave-one-out CMNN photo-z for a CSV catalog.
/// Usage:
///   loo_from_csv <CATALOG.csv> [OUTPUT.csv] [--min-colors N] [--p P] [--seed S]
/// Example:
///   RUST_LOG=info loo_from_csv tests/data/mini_catalog.csv photoz.csv --min-colors 3
fn main() -> Result<(), CmnnError> {
    env_logger::init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let mut take_flag = |name: &str| -> Option<String> {
        let pos = args.iter().position(|a| a == name)?;
        args.remove(pos);
        (pos < args.len()).then(|| args.remove(pos))
    };

    let mut builder = CmnnParams::builder();
    if let Some(v) = take_flag("--min-colors") {
        builder = builder.min_valid_colors(parse_arg("--min-colors", &v)?);
    }
    if let Some(v) = take_flag("--p") {
        builder = builder.confidence_probability(parse_arg("--p", &v)?);
    }
    let seed: u64 = match take_flag("--seed") {
        Some(v) => parse_arg("--seed", &v)?,
        None => 42,
    };
    let params = builder.build()?;

    let input = Utf8PathBuf::from(
        args.first()
            .cloned()
            .unwrap_or_else(|| "tests/data/mini_catalog.csv".to_string()),
    );
    let output = args.get(1).map(Utf8PathBuf::from);

    let mut sample = read_catalog(&input, &CatalogColumns::default())?;
    eprintln!("{params:#}");

    let results = sample.estimate_all_photoz_parallel(&params, seed)?;
    eprintln!("{:#}", results.summary());
    match results.quality(sample.redshifts()) {
        Some(q) => eprintln!("{q:#}"),
        None => eprintln!("no photo-z estimated"),
    }

    if let Some(path) = output {
        write_photoz(&path, &sample, &results)?;
        eprintln!("[loo_from_csv] wrote {path}");
    }
    sample.apply_photoz(&results);
    for (i, g) in sample.iter().enumerate().take(5) {
        match (g.photo_z(), g.photo_z_err()) {
            (Some(pz), Some(err)) => {
                eprintln!("[loo_from_csv] #{i}: z={:.3} photo-z={pz:.3} ± {err:.3}", g.redshift())
            }
            _ => eprintln!("[loo_from_csv] #{i}: z={:.3} no color-matched neighbor", g.redshift()),
        }
    }

    Ok(())
}

fn parse_arg<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, CmnnError> {
    value
        .parse()
        .map_err(|_| CmnnError::InvalidParameter(format!("{flag}: cannot parse '{value}'")))
}
