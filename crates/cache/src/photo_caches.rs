use std::sync::Arc;

use photo_search_core::{
    DEFAULT_IMAGE_CACHE_FRACTION, DEFAULT_LOCATION_CACHE_FRACTION, DecodedImage, LocationInfo,
};

use crate::{CacheStatsSnapshot, MemoryBudget, MemoryCache};

/// The image and location caches shared by every fetch and every search.
///
/// Cloning is cheap and yields handles to the same caches.
#[derive(Debug, Clone)]
pub struct PhotoCaches {
    images: Arc<MemoryCache<String, DecodedImage>>,
    locations: Arc<MemoryCache<String, LocationInfo>>,
}

impl PhotoCaches {
    #[must_use]
    pub fn new(image_capacity: usize, location_capacity: usize) -> Self {
        Self {
            images: Arc::new(MemoryCache::new("images", image_capacity)),
            locations: Arc::new(MemoryCache::new("locations", location_capacity)),
        }
    }

    /// Sizes each cache as a fraction of `budget`.
    #[must_use]
    pub fn from_budget(budget: MemoryBudget, image_fraction: f64, location_fraction: f64) -> Self {
        let image_capacity = budget.share(image_fraction);
        let location_capacity = budget.share(location_fraction);
        tracing::info!(
            budget_bytes = budget.total_bytes(),
            image_capacity,
            location_capacity,
            "photo caches sized"
        );
        Self::new(image_capacity, location_capacity)
    }

    /// Default split (20% images, 10% locations) of the available memory.
    #[must_use]
    pub fn with_default_split(budget: MemoryBudget) -> Self {
        Self::from_budget(budget, DEFAULT_IMAGE_CACHE_FRACTION, DEFAULT_LOCATION_CACHE_FRACTION)
    }

    /// Decoded images keyed by image path.
    #[must_use]
    pub fn images(&self) -> &MemoryCache<String, DecodedImage> {
        &self.images
    }

    /// Locations keyed by photo id.
    #[must_use]
    pub fn locations(&self) -> &MemoryCache<String, LocationInfo> {
        &self.locations
    }

    pub fn clear(&self) {
        self.images.clear();
        self.locations.clear();
        tracing::info!("photo caches cleared");
    }

    #[must_use]
    pub fn stats(&self) -> (CacheStatsSnapshot, CacheStatsSnapshot) {
        (self.images.stats(), self.locations.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    #[test]
    fn test_from_budget_split() {
        let caches = PhotoCaches::with_default_split(MemoryBudget::from_bytes(10_000));
        assert_eq!(caches.images().capacity(), 2_000);
        assert_eq!(caches.locations().capacity(), 1_000);
    }

    #[test]
    fn test_clones_share_storage() {
        let caches = PhotoCaches::new(1_000, 1_000);
        let other = caches.clone();
        other.locations().put("42".to_owned(), LocationInfo::new(1.0, 2.0));
        assert_eq!(caches.locations().get("42"), Some(LocationInfo::new(1.0, 2.0)));
    }

    #[test]
    fn test_clear_empties_both() {
        let caches = PhotoCaches::new(1_000, 1_000);
        let image = DecodedImage::new(DynamicImage::ImageRgb8(RgbImage::new(2, 2)));
        caches.images().put("1/2_3_b.jpg".to_owned(), image);
        caches.locations().put("2".to_owned(), LocationInfo::new(0.0, 0.0));

        caches.clear();

        assert!(caches.images().get("1/2_3_b.jpg").is_none());
        assert!(caches.locations().get("2").is_none());
    }
}
