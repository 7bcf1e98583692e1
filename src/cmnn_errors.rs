use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmnnError {
    #[error("Confidence probability must lie in the open interval (0, 1), got {0}")]
    InvalidConfidenceProbability(f64),

    #[error("min_valid_colors must lie in [1, {n_colors}], got {min_valid_colors}")]
    InvalidMinValidColors {
        min_valid_colors: usize,
        n_colors: usize,
    },

    #[error("Invalid CMNN parameter: {0}")]
    InvalidParameter(String),

    #[error("The galaxy sample is empty")]
    EmptySample,

    #[error("Galaxy {index} has {found} colors, expected {expected}")]
    InconsistentDimensionality {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Color count {0} exceeds the supported maximum of {max}", max = crate::constants::MAX_COLORS)]
    TooManyColors(usize),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Catalog column not found: {0}")]
    MissingColumn(String),

    #[error("Invalid catalog value in column {column} at row {row}: {value}")]
    InvalidCatalogValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Gaussian noise generation failed: {0:?}")]
    NoiseInjectionError(rand_distr::NormalError),
}

impl From<rand_distr::NormalError> for CmnnError {
    fn from(err: rand_distr::NormalError) -> Self {
        CmnnError::NoiseInjectionError(err)
    }
}

impl PartialEq for CmnnError {
    fn eq(&self, other: &Self) -> bool {
        use CmnnError::*;
        match (self, other) {
            (InvalidConfidenceProbability(a), InvalidConfidenceProbability(b)) => {
                a.to_bits() == b.to_bits()
            }
            (
                InvalidMinValidColors {
                    min_valid_colors: a,
                    n_colors: ka,
                },
                InvalidMinValidColors {
                    min_valid_colors: b,
                    n_colors: kb,
                },
            ) => a == b && ka == kb,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (
                InconsistentDimensionality {
                    index: ia,
                    expected: ea,
                    found: fa,
                },
                InconsistentDimensionality {
                    index: ib,
                    expected: eb,
                    found: fb,
                },
            ) => ia == ib && ea == eb && fa == fb,
            (TooManyColors(a), TooManyColors(b)) => a == b,
            (MissingColumn(a), MissingColumn(b)) => a == b,
            (
                InvalidCatalogValue {
                    column: ca,
                    row: ra,
                    value: va,
                },
                InvalidCatalogValue {
                    column: cb,
                    row: rb,
                    value: vb,
                },
            ) => ca == cb && ra == rb && va == vb,
            (NoiseInjectionError(a), NoiseInjectionError(b)) => a == b,

            // Not comparable by payload: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (EmptySample, EmptySample) => true,

            _ => false,
        }
    }
}
