use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Parameter document is invalid: required section '{0}' is missing")]
    MissingSection(&'static str),

    #[error("Required table '{table}' is not available; run it before '{calculator}'")]
    MissingTable {
        table: &'static str,
        calculator: &'static str,
    },

    #[error(
        "Lookup in '{table}' for building '{building}' at period {period} \
         matched {found} rows, expected exactly 1"
    )]
    RowMismatch {
        table: &'static str,
        building: String,
        period: i32,
        found: usize,
    },

    #[error("Lookup in '{table}' for year {year} matched {found} rows, expected exactly 1")]
    YearMismatch {
        table: &'static str,
        year: i32,
        found: usize,
    },

    #[error("Duplicate row in '{table}' for key {key}")]
    DuplicateRow { table: &'static str, key: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SimulationError {
    fn from(e: serde_json::Error) -> Self {
        SimulationError::SerializationError(e.to_string())
    }
}
