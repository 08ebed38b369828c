//! Error types for docweave library.

use std::io;
use thiserror::Error;

/// Result type alias for docweave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docweave library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while writing the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Heading level outside the range the target format has styles for.
    #[error("Invalid heading level {0}: expected 0..=9")]
    InvalidLevel(i32),

    /// List nesting depth outside the supported range.
    #[error("Invalid list nesting level {0}: expected 0..=8")]
    InvalidNesting(i32),

    /// Paragraph style name that the style sheet does not define.
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// List continuation that refers to a list never opened in this document.
    #[error("Unknown list: {0}")]
    UnknownList(u32),

    /// Accumulated content cannot be mapped to the target format.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// ZIP container error.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Malformed JSON content.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

// The temp file is deleted when the PersistError's handle drops.
impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}
