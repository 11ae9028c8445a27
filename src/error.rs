// Error types for the inspection pipeline
//
// Only I/O, encoding and row-shape problems surface as errors. Missing
// columns, malformed audit names and unknown status tokens are absorbed by
// fallbacks inside the pipeline and never reach this type.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    InvalidShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
