use std::io;
use thiserror::Error;

/// Error type for CSV reading operations.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A single record could not be tokenized.
    ///
    /// This is row-local: the reader logs it and moves on to the next record.
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReaderError {
    /// Returns true if the error only affects the current row.
    pub fn is_row_local(&self) -> bool {
        matches!(self, ReaderError::MalformedRow { .. })
    }
}

impl From<csv::Error> for ReaderError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, csv::Position::line);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => ReaderError::Io(e),
            kind => ReaderError::MalformedRow {
                line,
                message: format!("{kind:?}"),
            },
        }
    }
}

/// Result type alias for reading operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
