//! Approximate cost of a cached value.

use photo_search_core::{DecodedImage, LocationInfo};

/// Cost of a value in the cache's capacity unit (bytes, approximately).
pub trait CacheWeight {
    fn cache_weight(&self) -> usize;
}

impl CacheWeight for DecodedImage {
    fn cache_weight(&self) -> usize {
        self.byte_len()
    }
}

impl CacheWeight for LocationInfo {
    fn cache_weight(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

impl CacheWeight for Vec<u8> {
    fn cache_weight(&self) -> usize {
        self.len()
    }
}

impl CacheWeight for String {
    fn cache_weight(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    #[test]
    fn test_image_weight_is_pixel_bytes() {
        let image = DecodedImage::new(DynamicImage::ImageRgba8(RgbaImage::new(10, 10)));
        assert_eq!(image.cache_weight(), 400);
    }

    #[test]
    fn test_location_weight_is_two_floats() {
        assert_eq!(LocationInfo::new(1.0, 2.0).cache_weight(), 16);
    }
}
