#![allow(dead_code)]

use cmnn::galaxy::noise::simulate_observed_galaxy;
use cmnn::{Galaxy, Sample};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Galaxy with every color present and a uniform uncertainty.
pub fn uniform_galaxy(colors: &[f64], err: f64, redshift: f64) -> Galaxy {
    Galaxy::from_complete_colors(colors, &vec![err; colors.len()], redshift).unwrap()
}

/// Noiseless magnitudes in six bands for a toy spectral model varying smoothly with redshift.
pub fn toy_magnitudes(z: f64) -> [f64; 6] {
    let mut mags = [0.0; 6];
    for (b, m) in mags.iter_mut().enumerate() {
        *m = 24.0 + 0.6 * (1.6 * z + 0.9 * b as f64).sin() + 0.1 * b as f64;
    }
    mags
}

/// Synthetic survey sample: redshifts uniform in [0.1, 2.0], Gaussian photometric noise with
/// σ = 0.05 mag, each band independently dropped with probability `drop_probability`.
pub fn synthetic_sample(n: usize, seed: u64, drop_probability: f64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let galaxies = (0..n)
        .map(|_| {
            let z: f64 = rng.random_range(0.1..2.0);
            let mags: Vec<Option<f64>> = toy_magnitudes(z)
                .iter()
                .map(|&m| (!rng.random_bool(drop_probability)).then_some(m))
                .collect();
            let errs = vec![Some(0.05); 6];
            simulate_observed_galaxy(&mags, &errs, z, &mut rng).unwrap()
        })
        .collect();
    Sample::new(galaxies).unwrap()
}
