//! Tunables of a search session and their validation.

use photo_search_core::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_PER_PAGE, EVENT_CHANNEL_CAPACITY};

use crate::ConfigError;

/// Largest page size the Flickr search accepts.
pub const MAX_PER_PAGE: u32 = 500;

/// Tunables of a [`crate::SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub per_page: u32,
    pub concurrency_limit: usize,
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            event_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub const fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// # Errors
    /// Returns an error for a zero concurrency limit or an out-of-range page size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::PerPageOutOfRange { got: self.per_page, max: MAX_PER_PAGE });
        }
        Ok(())
    }
}
