//! Square crop of a user-selected region.
//!
//! The crop runs before anything is sent to the server: the chosen file is opened
//! as a [`CropSelection`], the user adjusts a 1:1 rectangle, and applying the
//! selection produces the PNG that gets uploaded as `avatar.png`. The circular
//! mask shown while cropping is presentation only; the output is always square.

use crate::image::{ImageProcessor, ImageResize};
use avatar_core::constants::CROPPED_CONTENT_TYPE;
use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("Invalid crop selection: {0}")]
    InvalidSelection(String),

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode cropped image: {0}")]
    Encode(String),
}

/// Crop rectangle in source pixel coordinates.
///
/// Signed so that a selection dragged past the top-left edge is representable and
/// rejected rather than wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(x: i64, y: i64, size: i64) -> Self {
        Self::new(x, y, size, size)
    }

    /// Check the rectangle is a positive square lying entirely inside a
    /// `source_width` x `source_height` image.
    pub fn validate(&self, source_width: u32, source_height: u32) -> Result<(), CropError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(CropError::InvalidSelection(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width != self.height {
            return Err(CropError::InvalidSelection(format!(
                "selection must be square, got {}x{}",
                self.width, self.height
            )));
        }
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        let inside = match (right, bottom) {
            (Some(right), Some(bottom)) => {
                self.x >= 0
                    && self.y >= 0
                    && right <= i64::from(source_width)
                    && bottom <= i64::from(source_height)
            }
            _ => false,
        };
        if !inside {
            return Err(CropError::InvalidSelection(format!(
                "({}, {}, {}, {}) lies outside the {}x{} source",
                self.x, self.y, self.width, self.height, source_width, source_height
            )));
        }
        Ok(())
    }
}

pub struct CropEngine;

impl CropEngine {
    /// Crop `source` to `rect` and encode the square as PNG at its native resolution.
    pub fn crop(source: &[u8], rect: CropRect) -> Result<Vec<u8>, CropError> {
        let (img, _) =
            ImageProcessor::decode(source).map_err(|e| CropError::Decode(e.to_string()))?;
        Self::crop_image(&img, rect)
    }

    pub fn crop_image(img: &DynamicImage, rect: CropRect) -> Result<Vec<u8>, CropError> {
        let (width, height) = img.dimensions();
        rect.validate(width, height)?;

        // validate() guarantees the values are non-negative and fit in the source
        let cropped = img.crop_imm(
            rect.x as u32,
            rect.y as u32,
            rect.width as u32,
            rect.height as u32,
        );

        ImageProcessor::encode(&cropped, ImageFormat::Png)
            .map_err(|e| CropError::Encode(e.to_string()))
    }
}

/// An open crop session over one chosen file.
///
/// Dropping it (or calling [`CropSelection::cancel`]) discards the selection
/// without producing any output.
pub struct CropSelection {
    source: DynamicImage,
    rect: CropRect,
}

impl CropSelection {
    /// Decode the chosen file and start with the largest centered square selected.
    pub fn open(source: &[u8]) -> Result<Self, CropError> {
        let (img, _) =
            ImageProcessor::decode(source).map_err(|e| CropError::Decode(e.to_string()))?;
        let (width, height) = img.dimensions();
        let side = i64::from(width.min(height));
        let rect = CropRect::square(
            (i64::from(width) - side) / 2,
            (i64::from(height) - side) / 2,
            side,
        );
        Ok(Self { source: img, rect })
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn rect(&self) -> CropRect {
        self.rect
    }

    /// Move or resize the selection. Rejected rectangles leave the current one in place.
    pub fn select(&mut self, rect: CropRect) -> Result<(), CropError> {
        let (width, height) = self.source_dimensions();
        rect.validate(width, height)?;
        self.rect = rect;
        Ok(())
    }

    /// Encode the selected square. Consumes the session.
    pub fn apply(self) -> Result<Vec<u8>, CropError> {
        CropEngine::crop_image(&self.source, self.rect)
    }

    pub fn cancel(self) {}

    /// Content type of the bytes produced by [`CropSelection::apply`].
    pub fn output_content_type() -> &'static str {
        CROPPED_CONTENT_TYPE
    }

    /// Preview of the current selection scaled to `size`, for display next to the cropper.
    pub fn preview(&self, size: u32) -> Result<DynamicImage, CropError> {
        let (width, height) = self.source_dimensions();
        self.rect.validate(width, height)?;
        let cropped = self.source.crop_imm(
            self.rect.x as u32,
            self.rect.y as u32,
            self.rect.width as u32,
            self.rect.height as u32,
        );
        Ok(ImageResize::resize_image(&cropped, size, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn source(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        // Mark the pixel at (10, 10) so the crop origin is observable
        img.put_pixel(10, 10, Rgba([255, 0, 0, 255]));
        ImageProcessor::encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_crop_produces_png_at_native_size() {
        let png = CropEngine::crop(&source(100, 100), CropRect::square(10, 10, 80)).unwrap();

        assert_eq!(ImageProcessor::sniff_content_type(&png), Some("image/png"));
        let (img, _) = ImageProcessor::decode(&png).unwrap();
        assert_eq!(img.dimensions(), (80, 80));
        assert_eq!(img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_crop_outside_bounds_is_invalid_selection() {
        let data = source(100, 100);

        for rect in [
            CropRect::square(30, 30, 80),
            CropRect::square(-1, 0, 50),
            CropRect::square(0, 0, 101),
            CropRect::square(i64::MAX, 0, 1),
            CropRect::square(0, i64::MAX - 1, 2),
        ] {
            assert!(matches!(
                CropEngine::crop(&data, rect),
                Err(CropError::InvalidSelection(_))
            ));
        }
    }

    #[test]
    fn test_crop_rejects_non_square_and_empty() {
        let data = source(100, 100);
        assert!(matches!(
            CropEngine::crop(&data, CropRect::new(0, 0, 50, 40)),
            Err(CropError::InvalidSelection(_))
        ));
        assert!(matches!(
            CropEngine::crop(&data, CropRect::square(0, 0, 0)),
            Err(CropError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_crop_undecodable_source() {
        assert!(matches!(
            CropEngine::crop(b"definitely not an image", CropRect::square(0, 0, 1)),
            Err(CropError::Decode(_))
        ));
    }

    #[test]
    fn test_selection_starts_centered_and_keeps_rect_on_rejection() {
        let mut selection = CropSelection::open(&source(120, 80)).unwrap();
        assert_eq!(selection.rect(), CropRect::square(20, 0, 80));

        assert!(selection.select(CropRect::square(100, 0, 40)).is_err());
        assert_eq!(selection.rect(), CropRect::square(20, 0, 80));

        selection.select(CropRect::square(10, 10, 60)).unwrap();
        let preview = selection.preview(40).unwrap();
        assert_eq!(preview.dimensions(), (40, 40));

        let png = selection.apply().unwrap();
        assert_eq!(ImageProcessor::get_dimensions(&png), Some((60, 60)));
        assert_eq!(CropSelection::output_content_type(), "image/png");
    }
}
