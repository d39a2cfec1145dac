use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error in opening file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    #[error("Invalid numeric value for {field}: '{value}'")]
    NumericParse { field: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("None of the {attempted} input files could be read")]
    NoReadableInput { attempted: usize },
}

impl ProcessingError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProcessingError::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Errors confined to a single line; the caller skips the line and moves on.
    pub fn is_line_recoverable(&self) -> bool {
        matches!(
            self,
            ProcessingError::MalformedRecord { .. } | ProcessingError::NumericParse { .. }
        )
    }
}
