//! Typed error enum for remote photo source calls.

use thiserror::Error;

/// Errors a `PhotoSource` can report for a single remote call.
///
/// Cloneable so that one failure can be logged, counted and returned without
/// re-wrapping it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Transport-level failure: connection, timeout, non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The payload arrived but could not be interpreted (bad JSON, undecodable image).
    #[error("decode error: {0}")]
    Decode(String),

    /// The remote service answered with an explicit failure status.
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },
}

impl SourceError {
    /// Whether this error is transient (a later identical call may succeed).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
