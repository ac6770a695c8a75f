use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_SIZE_SUFFIX;

/// Identifies one remote photo, as returned by a keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    pub id: String,
    pub server: String,
    pub secret: String,
    #[serde(default)]
    pub title: String,
}

impl PhotoDescriptor {
    pub fn new(id: impl Into<String>, server: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { id: id.into(), server: server.into(), secret: secret.into(), title: String::new() }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Path of the image under the image host, e.g. `65535/5312_ab12_b.jpg`.
    ///
    /// Also the image cache key, so it must stay independent of the host.
    #[must_use]
    pub fn image_path(&self) -> String {
        format!("{}/{}_{}_{}.jpg", self.server, self.id, self.secret, DEFAULT_SIZE_SUFFIX)
    }
}

/// Geolocation of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationInfo {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A decoded raster, shared read-only between the image cache and records.
#[derive(Clone)]
pub struct DecodedImage(Arc<DynamicImage>);

impl DecodedImage {
    #[must_use]
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Size of the pixel buffer in bytes; used as the cache cost.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.0.as_bytes().len()
    }

    #[must_use]
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.0
    }

    /// Whether both handles point at the same decoded buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.byte_len())
            .finish()
    }
}

/// A fully resolved photo: location and image were both obtained.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    pub id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: DecodedImage,
}

impl PhotoRecord {
    #[must_use]
    pub fn new(descriptor: &PhotoDescriptor, location: LocationInfo, image: DecodedImage) -> Self {
        Self {
            id: descriptor.id.clone(),
            title: descriptor.title.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            image,
        }
    }

    #[must_use]
    pub const fn location(&self) -> LocationInfo {
        LocationInfo::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_image_path_format() {
        let descriptor = PhotoDescriptor::new("5312", "65535", "ab12");
        assert_eq!(descriptor.image_path(), "65535/5312_ab12_b.jpg");
    }

    #[test]
    fn test_descriptor_deserializes_without_title() {
        let descriptor: PhotoDescriptor =
            serde_json::from_str(r#"{"id":"1","server":"2","secret":"3"}"#).unwrap();
        assert_eq!(descriptor.title, "");
    }

    #[test]
    fn test_decoded_image_byte_len() {
        let image = DecodedImage::new(DynamicImage::ImageRgb8(RgbImage::new(4, 2)));
        assert_eq!(image.byte_len(), 4 * 2 * 3);
        assert_eq!((image.width(), image.height()), (4, 2));
    }

    #[test]
    fn test_record_copies_descriptor_fields() {
        let descriptor = PhotoDescriptor::new("7", "1", "s").with_title("harbour");
        let image = DecodedImage::new(DynamicImage::ImageRgb8(RgbImage::new(1, 1)));
        let record = PhotoRecord::new(&descriptor, LocationInfo::new(51.5, -0.12), image.clone());
        assert_eq!(record.id, "7");
        assert_eq!(record.title, "harbour");
        assert_eq!(record.location(), LocationInfo::new(51.5, -0.12));
        assert!(record.image.ptr_eq(&image));
    }
}
