//! Error types for the resizer workbook.

use thiserror::Error;

/// Errors that can occur in the in-memory workbook and its functions.
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at column {column}: {message}")]
    Parse { column: usize, message: String },

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Cannot change part of an array at {0}")]
    PartOfArray(String),

    #[error("{function}: {message}")]
    Argument {
        function: &'static str,
        message: String,
    },

    #[error("{0}")]
    Raised(String),

    #[error(transparent)]
    Resizer(#[from] resizer_core::ResizerError),
}

pub type Result<T> = std::result::Result<T, WorkbookError>;
