//! Error types for the output sinks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or appending to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Reading or writing the workbook failed.
    #[error("spreadsheet error for {path}: {source}")]
    Workbook {
        /// Workbook path.
        path: PathBuf,
        /// The underlying xlsx error.
        #[source]
        source: umya_spreadsheet::XlsxError,
    },

    /// The workbook exists but does not have the expected layout.
    #[error("spreadsheet {path} is unusable: {reason}")]
    Layout {
        /// Workbook path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Writing a CSV record failed.
    #[error("CSV error for {path}: {source}")]
    Csv {
        /// CSV path.
        path: PathBuf,
        /// The underlying csv error.
        #[source]
        source: csv::Error,
    },

    /// File system error (open, stat, flush).
    #[error("IO error for {path}: {source}")]
    Io {
        /// File path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Creates a workbook error.
    pub fn workbook(path: impl Into<PathBuf>, source: umya_spreadsheet::XlsxError) -> Self {
        Self::Workbook {
            path: path.into(),
            source,
        }
    }

    /// Creates a layout error.
    pub fn layout(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Layout {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
