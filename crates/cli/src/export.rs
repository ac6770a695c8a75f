//! Saving fetched photos to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use photo_search_core::PhotoRecord;

/// `~/Pictures/photo-search`, or `./photo-search` without a pictures directory.
pub(crate) fn default_export_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from(".")).join("photo-search")
}

/// Writes `record` as `<dir>/<id>.jpg`, optionally converted to grayscale.
pub(crate) fn save_record(record: &PhotoRecord, dir: &Path, monochrome: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create export directory {}", dir.display()))?;
    let path = dir.join(format!("{}.jpg", sanitize_file_stem(&record.id)));

    let source = record.image.as_dynamic();
    // JPEG has no alpha channel.
    let output = if monochrome {
        DynamicImage::ImageLuma8(source.to_luma8())
    } else {
        DynamicImage::ImageRgb8(source.to_rgb8())
    };
    output
        .save_with_format(&path, ImageFormat::Jpeg)
        .with_context(|| format!("cannot write {}", path.display()))?;
    tracing::debug!(photo_id = %record.id, path = %path.display(), monochrome, "photo exported");
    Ok(path)
}

fn sanitize_file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "photo".to_owned() } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use photo_search_core::{DecodedImage, LocationInfo, PhotoDescriptor};

    fn red_record(id: &str) -> PhotoRecord {
        let image = RgbImage::from_pixel(8, 6, Rgb([200, 10, 10]));
        PhotoRecord::new(
            &PhotoDescriptor::new(id, "1", "s"),
            LocationInfo::new(1.0, 2.0),
            DecodedImage::new(DynamicImage::ImageRgb8(image)),
        )
    }

    #[test]
    fn test_save_color() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_record(&red_record("42"), dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join("42.jpg"));

        let written = image::open(&path).unwrap();
        assert_eq!(written.dimensions(), (8, 6));
        assert_eq!(written.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_save_monochrome() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_record(&red_record("43"), dir.path(), true).unwrap();
        let written = image::open(&path).unwrap();
        assert_eq!(written.color(), image::ColorType::L8);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        save_record(&red_record("44"), &nested, false).unwrap();
        assert!(nested.join("44.jpg").exists());
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("5312/../x"), "5312____x");
        assert_eq!(sanitize_file_stem(""), "photo");
    }
}
