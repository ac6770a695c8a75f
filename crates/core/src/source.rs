use async_trait::async_trait;

use crate::{LocationInfo, PhotoDescriptor, SearchPage, SourceResult};

/// Remote photo service consumed by the fetch pipeline.
///
/// Implementations own transport concerns (timeouts, JSON decoding); the
/// pipeline only sees typed results.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Search photos by keyword. `page` is 1-based.
    async fn search_photos(&self, keyword: &str, per_page: u32, page: u32)
    -> SourceResult<SearchPage>;

    /// Fetch the geolocation of a photo. `Ok(None)` when the photo has none.
    async fn fetch_location(&self, photo_id: &str) -> SourceResult<Option<LocationInfo>>;

    /// Fetch the raw (still encoded) image bytes of a photo.
    async fn fetch_image_bytes(&self, descriptor: &PhotoDescriptor) -> SourceResult<Vec<u8>>;
}
