use thiserror::Error;

/// Everything that can abort a pipeline run.
///
/// Only loading and configuration can fail. Empty groups, missing pivot
/// cells and collapsed outlier bounds are normal data conditions and are
/// expressed structurally, never through this type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A row's date could not be parsed, its value is not a finite
    /// non-negative number, or its date repeats an earlier row.
    #[error("Malformed input at {location}: {reason}")]
    MalformedInput { location: String, reason: String },

    /// The input lacks the configured date or value column.
    #[error("Input is missing the '{0}' column")]
    MissingColumn(String),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl PipelineError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, PipelineError::MalformedInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
