//! Shared constants for photo-search.
//!
//! Centralizes defaults that are otherwise needed by several crates.

/// Number of photos requested per search page.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Maximum number of paired fetches holding an admission slot at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 20;

/// Share of the memory budget given to decoded images.
pub const DEFAULT_IMAGE_CACHE_FRACTION: f64 = 0.2;

/// Share of the memory budget given to location metadata.
pub const DEFAULT_LOCATION_CACHE_FRACTION: f64 = 0.1;

/// Flickr REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.flickr.com/services/rest/";

/// Flickr static image host.
pub const DEFAULT_IMAGE_URL: &str = "https://live.staticflickr.com";

/// Size suffix for fetched images ("b" is 1024px on the longest side).
pub const DEFAULT_SIZE_SUFFIX: &str = "b";

/// HTTP timeout for every remote call, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Capacity of the progress and record broadcast channels.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
