//! Error types for the zebrafish-assay library.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum AssayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid value '{value}' at row {row}, column '{column}'")]
    InvalidValue {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Invalid animal pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for AssayError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        AssayError::Plot(e.to_string())
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AssayError>;
