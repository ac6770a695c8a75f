//! Typed error enum for the Flickr client.

use photo_search_core::SourceError;
use thiserror::Error;

/// Errors from Flickr API and image host calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl ClientError {
    /// Whether this error is transient (a later identical call may succeed).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<ClientError> for SourceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::HttpRequest(_) | ClientError::HttpStatus { .. } | ClientError::ClientInit(_) => {
                Self::Network(err.to_string())
            },
            ClientError::JsonParse { .. } | ClientError::InvalidCoordinate(_) => {
                Self::Decode(err.to_string())
            },
            ClientError::Api { code, message } => Self::Api { code, message },
        }
    }
}
