
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("experiment {name} found in {location} is NOT supported")]
    UnsupportedExperiment { name: String, location: String },

    #[error("cannot derive experiment type from file name {0:?}")]
    InvalidFileName(PathBuf),

    #[error("column '{column}' missing from {path:?}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("invalid value '{value}' in column '{column}' of {path:?}")]
    InvalidValue { column: String, value: String, path: PathBuf },

    #[error("no {what} row for payload {payload} of {experiment}")]
    MissingPayload { what: &'static str, experiment: String, payload: u64 },

    #[error("{count} {what} rows for payload {payload} of {experiment}, expected one")]
    DuplicateRow { what: &'static str, experiment: String, payload: u64, count: usize },

    #[error("no requirements for {0}")]
    NoRequirements(String),

    #[error("requirement for {metric} at payload {payload} is zero")]
    ZeroRequirement { metric: String, payload: u64 },

    #[error("no reference for {0:?}")]
    MissingReference(PathBuf),

    #[error("cannot find directory {0:?}")]
    NotADirectory(PathBuf),

    #[error("empty sample series")]
    EmptySeries,

    #[error("percentile {0} outside of [0, 100]")]
    InvalidPercentile(f64),

    #[error("fail threshold {0} outside of [0, 1]")]
    InvalidThreshold(f64),
}
