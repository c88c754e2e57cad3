//! Derived-variant generation.
//!
//! Every avatar gets the same fixed set of square variants. Generation is all or
//! nothing: a failure on any size fails the whole call, so callers never see a
//! partial set.

use crate::image::{ImageProcessor, ImageResize};
use avatar_core::VariantName;
use bytes::Bytes;
use image::GenericImageView;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to decode original: {0}")]
    Decode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode {variant} variant: {message}")]
    Encode {
        variant: VariantName,
        message: String,
    },

    #[error("Variant generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Variant generation aborted: {0}")]
    Aborted(String),
}

/// One encoded variant, ready to be written to storage.
#[derive(Debug, Clone)]
pub struct GeneratedVariant {
    pub name: VariantName,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
    pub data: Bytes,
}

/// Produces the full variant set for an original image.
///
/// Implementations are CPU-bound and synchronous; async callers run them on the
/// blocking pool.
pub trait VariantGenerator: Send + Sync {
    fn generate(
        &self,
        original: &[u8],
        mime_type: &str,
    ) -> Result<BTreeMap<VariantName, GeneratedVariant>, ConversionError>;
}

/// Resizes the original to 40x40, 80x80 and 160x160, keeping its format.
#[derive(Debug, Clone, Default)]
pub struct ConversionPipeline;

impl ConversionPipeline {
    pub fn new() -> Self {
        Self
    }
}

impl VariantGenerator for ConversionPipeline {
    fn generate(
        &self,
        original: &[u8],
        mime_type: &str,
    ) -> Result<BTreeMap<VariantName, GeneratedVariant>, ConversionError> {
        let start = std::time::Instant::now();

        let format = ImageProcessor::detect_format(mime_type)
            .ok_or_else(|| ConversionError::UnsupportedFormat(mime_type.to_string()))?;

        let (img, _) =
            ImageProcessor::decode(original).map_err(|e| ConversionError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let square = if width != height {
            tracing::warn!(
                width = width,
                height = height,
                "Original is not square, center-cropping before generating variants"
            );
            ImageResize::center_square(&img)
        } else {
            img
        };

        let mut variants = BTreeMap::new();
        for name in VariantName::ALL {
            let (target_width, target_height) = name.dimensions();
            let resized = ImageResize::resize_image(&square, target_width, target_height);
            let data = ImageProcessor::encode(&resized, format).map_err(|e| {
                ConversionError::Encode {
                    variant: name,
                    message: e.to_string(),
                }
            })?;

            variants.insert(
                name,
                GeneratedVariant {
                    name,
                    width: target_width,
                    height: target_height,
                    content_type: mime_type.to_lowercase(),
                    data: Bytes::from(data),
                },
            );
        }

        tracing::debug!(
            source_width = width,
            source_height = height,
            variant_count = variants.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generated avatar variants"
        );

        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 200, 30, 255]),
        ));
        ImageProcessor::encode(&img, format).unwrap()
    }

    #[test]
    fn test_generates_full_fixed_set() {
        let variants = ConversionPipeline::new()
            .generate(&encoded(80, 80, ImageFormat::Png), "image/png")
            .unwrap();

        assert_eq!(variants.len(), 3);
        for name in VariantName::ALL {
            let variant = &variants[&name];
            assert_eq!(
                ImageProcessor::get_dimensions(&variant.data),
                Some(name.dimensions())
            );
            assert_eq!(variant.content_type, "image/png");
        }
    }

    #[test]
    fn test_variants_keep_original_format() {
        let variants = ConversionPipeline::new()
            .generate(&encoded(200, 200, ImageFormat::Jpeg), "image/jpeg")
            .unwrap();

        let small = &variants[&VariantName::Small];
        assert_eq!(ImageProcessor::sniff_content_type(&small.data), Some("image/jpeg"));
    }

    #[test]
    fn test_non_square_original_is_center_cropped() {
        let variants = ConversionPipeline::new()
            .generate(&encoded(300, 100, ImageFormat::Png), "image/png")
            .unwrap();

        let large = &variants[&VariantName::Large];
        assert_eq!(ImageProcessor::get_dimensions(&large.data), Some((160, 160)));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let original = encoded(120, 120, ImageFormat::Png);
        let pipeline = ConversionPipeline::new();
        let first = pipeline.generate(&original, "image/png").unwrap();
        let second = pipeline.generate(&original, "image/png").unwrap();

        for name in VariantName::ALL {
            assert_eq!(first[&name].data, second[&name].data);
        }
    }

    #[test]
    fn test_corrupt_original_is_conversion_error() {
        let result = ConversionPipeline::new().generate(b"\x89PNG\r\n\x1a\ngarbage", "image/png");
        assert!(matches!(result, Err(ConversionError::Decode(_))));
    }

    #[test]
    fn test_unsupported_mime_is_conversion_error() {
        let result = ConversionPipeline::new()
            .generate(&encoded(10, 10, ImageFormat::Png), "image/svg+xml");
        assert!(matches!(result, Err(ConversionError::UnsupportedFormat(_))));
    }
}
