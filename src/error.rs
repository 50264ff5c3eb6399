use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset loading errors (fatal at startup)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet file: {0}")]
    Parquet(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("required column '{0}' not found in header")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': {reason}")]
    Malformed {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("dataset contains no rows")]
    Empty,
}

impl From<parquet::errors::ParquetError> for DataLoadError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        DataLoadError::Parquet(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for DataLoadError {
    fn from(err: arrow::error::ArrowError) -> Self {
        DataLoadError::Parquet(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Query errors (recoverable, surfaced to the user)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no input: {0}")]
    EmptyInput(String),
}
