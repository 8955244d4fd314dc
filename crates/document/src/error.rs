//! Document Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A document processing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The main resource is not markup at all. Callers fall back to writing
    /// the raw bytes.
    #[display("malformed HTML: {_0}")]
    MalformedHtml(#[error(not(source))] String),
    /// A decoration template failed to compile or render.
    #[display("template error")]
    Template,
    /// A built-in asset is missing from the binary.
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// A site quirk selector or host pattern could not be parsed.
    #[display("invalid selector: {_0}")]
    InvalidSelector(#[error(not(source))] String),
    /// The document tree could not be written back out as HTML.
    #[display("failed to serialize document")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Documents and templates are either valid or they're not.
        false
    }
}
