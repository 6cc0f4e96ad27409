use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Startup failures (data file or model artifact)
// ---------------------------------------------------------------------------

/// Anything that prevents the dataset or the model from being loaded.
///
/// All variants are fatal: the dashboard cannot render without both.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension for {} (expected .csv, .parquet or .pq)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed parquet file {}: {source}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("cannot decode parquet batch in {}: {source}", path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: column '{column}' has unsupported type {data_type}", path.display())]
    ColumnType {
        path: PathBuf,
        column: String,
        data_type: String,
    },

    #[error("{}, row {row}: cannot parse timestamp '{value}'", path.display())]
    BadTimestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{}, row {row}: column '{column}' value '{value}' is not a number", path.display())]
    BadNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{}, row {row}: missing value in column '{column}'", path.display())]
    MissingValue {
        path: PathBuf,
        row: usize,
        column: String,
    },

    #[error("{} contains no readings", path.display())]
    EmptyTable { path: PathBuf },

    #[error("cannot deserialize model artifact {}: {source}", path.display())]
    ModelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact {} has format version {found}, this build reads version {supported}", path.display())]
    ModelVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    #[error("model artifact {} was trained on features {found:?}, expected {expected:?}", path.display())]
    ModelSchema {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model artifact {} contains no trees", path.display())]
    EmptyModel { path: PathBuf },

    #[error("model artifact {}: tree {tree} splits on feature {feature_idx}, model has {n_features}", path.display())]
    FeatureIndex {
        path: PathBuf,
        tree: usize,
        feature_idx: usize,
        n_features: usize,
    },
}

// ---------------------------------------------------------------------------
// Prediction failures
// ---------------------------------------------------------------------------

/// Raised when a prediction request does not match the model's input contract.
///
/// The form always supplies all eleven fields, so none of these should
/// surface in normal operation.
#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("missing input feature '{0}'")]
    MissingFeature(String),

    #[error("unexpected input feature '{0}'")]
    UnexpectedFeature(String),

    #[error("model expects {expected} features, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),
}
