//! Local crop step run before any upload.
//!
//! The chosen file is opened as a [`CropSelection`]; without an explicit rectangle
//! the largest centered square is used. The output is always a PNG named
//! `avatar.png`.

use anyhow::{Context, Result};
use avatar_processing::{CropRect, CropSelection};
use std::path::{Component, Path};

/// Build the crop rectangle from command-line coordinates.
///
/// All three values must be given together; none means "use the default selection".
pub fn selection_rect(
    x: Option<i64>,
    y: Option<i64>,
    size: Option<i64>,
) -> Result<Option<CropRect>> {
    match (x, y, size) {
        (None, None, None) => Ok(None),
        (Some(x), Some(y), Some(size)) => Ok(Some(CropRect::square(x, y, size))),
        _ => Err(anyhow::anyhow!(
            "--x, --y and --size must be given together"
        )),
    }
}

/// Read a source image from disk.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Crop `source` to a square PNG.
pub fn crop_to_avatar(source: &[u8], rect: Option<CropRect>) -> Result<Vec<u8>> {
    let mut selection = CropSelection::open(source).context("Failed to open image for cropping")?;
    if let Some(rect) = rect {
        selection.select(rect).context("Invalid crop selection")?;
    }

    let rect = selection.rect();
    tracing::debug!(
        x = rect.x,
        y = rect.y,
        size = rect.width,
        "Cropping avatar"
    );

    selection.apply().context("Failed to encode cropped avatar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 120, 200, 255]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_selection_rect_requires_all_coordinates() {
        assert!(selection_rect(None, None, None).unwrap().is_none());
        assert_eq!(
            selection_rect(Some(10), Some(10), Some(80)).unwrap(),
            Some(CropRect::square(10, 10, 80))
        );
        assert!(selection_rect(Some(10), None, Some(80)).is_err());
    }

    #[test]
    fn test_crop_explicit_square() {
        let output = crop_to_avatar(&png(100, 100), Some(CropRect::square(10, 10, 80))).unwrap();
        let img = image::load_from_memory(&output).unwrap();
        assert_eq!((img.width(), img.height()), (80, 80));
        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_crop_defaults_to_centered_square() {
        let output = crop_to_avatar(&png(300, 120), None).unwrap();
        let img = image::load_from_memory(&output).unwrap();
        assert_eq!((img.width(), img.height()), (120, 120));
    }

    #[test]
    fn test_crop_out_of_bounds_is_rejected() {
        for rect in [CropRect::square(50, 50, 80), CropRect::square(i64::MAX, 0, 1)] {
            let err = crop_to_avatar(&png(100, 100), Some(rect)).unwrap_err();
            assert!(err.to_string().contains("Invalid crop selection"));
        }
    }

    #[test]
    fn test_read_source_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png(20, 20)).unwrap();

        assert_eq!(read_source(&path).unwrap(), png(20, 20));
        assert!(read_source(&dir.path().join("missing.png")).is_err());
        assert!(read_source(Path::new("../photo.png")).is_err());
    }
}
