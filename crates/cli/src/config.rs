//! Effective configuration: environment first, then command-line overrides.

use std::time::Duration;

use photo_search_cache::MemoryBudget;
use photo_search_core::{
    DEFAULT_API_URL, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IMAGE_CACHE_FRACTION,
    DEFAULT_IMAGE_URL, DEFAULT_LOCATION_CACHE_FRACTION, DEFAULT_PER_PAGE, env_fraction_with_default,
    env_parse_with_default, env_string,
};
use photo_search_service::SessionConfig;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AppConfig {
    #[serde(serialize_with = "redact")]
    pub api_key: Option<String>,
    pub api_url: String,
    pub image_url: String,
    pub per_page: u32,
    pub concurrency: usize,
    pub image_cache_fraction: f64,
    pub location_cache_fraction: f64,
    pub memory_budget_mb: Option<u64>,
    pub http_timeout_secs: u64,
}

fn redact<S: serde::Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some("***"),
        None => serializer.serialize_none(),
    }
}

impl AppConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            api_key: env_string("FLICKR_API_KEY"),
            api_url: env_string("PHOTO_SEARCH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            image_url: env_string("PHOTO_SEARCH_IMAGE_URL")
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_owned()),
            per_page: env_parse_with_default("PHOTO_SEARCH_PER_PAGE", DEFAULT_PER_PAGE),
            concurrency: env_parse_with_default("PHOTO_SEARCH_CONCURRENCY", DEFAULT_CONCURRENCY_LIMIT),
            image_cache_fraction: env_fraction_with_default(
                "PHOTO_SEARCH_IMAGE_CACHE_FRACTION",
                DEFAULT_IMAGE_CACHE_FRACTION,
            ),
            location_cache_fraction: env_fraction_with_default(
                "PHOTO_SEARCH_LOCATION_CACHE_FRACTION",
                DEFAULT_LOCATION_CACHE_FRACTION,
            ),
            memory_budget_mb: env_string("PHOTO_SEARCH_MEMORY_BUDGET_MB").and_then(|raw| {
                raw.parse().map_err(|e| {
                    tracing::warn!(value = %raw, error = %e, "invalid PHOTO_SEARCH_MEMORY_BUDGET_MB, detecting");
                }).ok()
            }),
            http_timeout_secs: env_parse_with_default(
                "PHOTO_SEARCH_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            ),
        }
    }

    pub(crate) fn with_overrides(mut self, per_page: Option<u32>, concurrency: Option<usize>) -> Self {
        if let Some(per_page) = per_page {
            self.per_page = per_page;
        }
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency;
        }
        self
    }

    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_per_page(self.per_page)
            .with_concurrency_limit(self.concurrency)
    }

    pub(crate) fn memory_budget(&self) -> MemoryBudget {
        self.memory_budget_mb.map_or_else(MemoryBudget::detect, MemoryBudget::from_megabytes)
    }

    pub(crate) const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub(crate) fn require_api_key(&self) -> anyhow::Result<String> {
        self.api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("FLICKR_API_KEY environment variable must be set"))
    }
}
