//! Typed error enums for the service layer.
//!
//! `ServiceError` is what session commands return. `PairError` describes why a
//! single paired fetch produced no record; it never leaves the fan-out except
//! through debug logs and tests.

use photo_search_core::SourceError;
use thiserror::Error;

/// Session-level error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The remote paged search failed. Nothing was fetched for the page.
    #[error("search: {0}")]
    Search(#[source] SourceError),

    /// Configuration rejected before the session was built.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Search(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Invalid session configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,
    #[error("per-page count must be between 1 and {max}, got {got}")]
    PerPageOutOfRange { got: u32, max: u32 },
}

/// Which half of a paired fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairHalf {
    Location,
    Image,
}

impl std::fmt::Display for PairHalf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Location => "location",
            Self::Image => "image",
        })
    }
}

/// Why a paired fetch produced no record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("network: {0}")]
    Network(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("photo has no location")]
    LocationUnavailable,
    #[error("cancelled")]
    Cancelled,
    #[error("admission gate closed")]
    GateClosed,
    /// One half failed and the sibling was cancelled or discarded.
    #[error("{failed} half failed: {cause}")]
    Partial {
        failed: PairHalf,
        #[source]
        cause: Box<PairError>,
    },
}

impl PairError {
    #[must_use]
    pub fn partial(failed: PairHalf, cause: Self) -> Self {
        Self::Partial { failed, cause: Box::new(cause) }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<SourceError> for PairError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Network(msg) => Self::Network(msg),
            SourceError::Decode(msg) => Self::Decode(msg),
            SourceError::Api { code, message } => Self::Api { code, message },
        }
    }
}
