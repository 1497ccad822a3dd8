use arrow::datatypes::DataType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DvfError {
    #[error("unsupported input format `{0}` (expected csv, parquet or pickle)")]
    UnsupportedFormat(String),

    #[error("mutation `{0}` has no property rows")]
    MalformedGroup(String),

    #[error("column `{column}` cannot be coerced to {target}: {source}")]
    TypeCoercion {
        column: String,
        target: DataType,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("column `{column}` has type {found}, expected {expected}")]
    UnexpectedColumnType {
        column: String,
        expected: DataType,
        found: DataType,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DvfError>;
