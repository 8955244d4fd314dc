//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not a binary or XML property list at all.
    #[display("malformed property list")]
    MalformedContainer,
    /// The property list decoded, but a key the webarchive schema requires is absent.
    #[display("not a webarchive: missing {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A key is present but holds the wrong property list type.
    #[display("not a webarchive: '{field}' is not {expected}")]
    InvalidField {
        /// The offending webarchive key.
        field: &'static str,
        /// The property list type the schema expects.
        expected: &'static str,
    },
    /// Reading the archive or writing an extracted resource failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Archives are either well-formed or not, and a failed write on a
        // local disk is not going to fix itself between attempts.
        false
    }
}
