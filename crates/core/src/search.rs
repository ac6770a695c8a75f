use serde::{Deserialize, Serialize};

use crate::PhotoDescriptor;

/// Keyword and page of the active search. Replaced, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub keyword: String,
    pub page: u32,
}

impl SearchParameters {
    pub fn new(keyword: impl Into<String>, page: u32) -> Self {
        Self { keyword: keyword.into(), page }
    }

    /// Parameters for the following page of the same keyword.
    #[must_use]
    pub fn next_page(&self) -> Self {
        Self { keyword: self.keyword.clone(), page: self.page.saturating_add(1) }
    }

    /// Whether these parameters describe a request worth sending.
    #[must_use]
    pub fn is_fetchable(&self) -> bool {
        !self.keyword.trim().is_empty() && self.page >= 1
    }
}

/// One page of search hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub page: u32,
    pub total_pages: u32,
    pub descriptors: Vec<PhotoDescriptor>,
}

/// Two-state completion flag exposed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Loading,
    Loaded,
}

impl FetchState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
        }
    }
}

impl std::fmt::Display for FetchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
