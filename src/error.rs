//! Conversion Error Types
//!
//! Every error raised while converting a file names that file. The error tree
//! below it (via `exn`) holds the underlying decode, parse or I/O failure.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file is not a readable webarchive.
    #[display("failed to decode webarchive: {}", _0.display())]
    Decode(#[error(not(source))] PathBuf),
    /// The archived page is not HTML. Its raw bytes were written instead.
    #[display("failed to parse HTML of {}, raw content written instead", _0.display())]
    Parse(#[error(not(source))] PathBuf),
    /// Decorating the page failed.
    #[display("failed to decorate {}", _0.display())]
    Decorate(#[error(not(source))] PathBuf),
    /// Reading the archive or writing output failed.
    #[display("I/O error while converting {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Configuration could not be loaded or turned into a converter.
    #[display("invalid configuration")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Every failure is a data-format or local filesystem fault.
        false
    }
}
