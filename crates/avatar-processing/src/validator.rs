use crate::image::ImageProcessor;
use avatar_core::constants::MAX_IMAGE_DIMENSION;

/// Common validation errors for uploaded avatars
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File is not a decodable image: {0}")]
    NotAnImage(String),

    #[error("Image dimensions too large: {width}x{height} (max: {max}x{max})")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },
}

/// An upload that passed every check, with the content type it will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    /// Sniffed from the bytes; a mislabelled PNG is stored as PNG.
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

/// Avatar upload validator
///
/// Enforces the size cap, the raster content-type allow list, and a readable
/// image header within the dimension cap. Only the header is parsed here;
/// pixel data is decoded later, on the blocking pool.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Run every check against an upload.
    ///
    /// The declared type must be allowed, and so must the type sniffed from the bytes;
    /// the sniffed one wins when they differ.
    pub fn validate(
        &self,
        data: &[u8],
        declared_content_type: &str,
    ) -> Result<ValidatedImage, ValidationError> {
        self.validate_file_size(data.len())?;
        self.validate_content_type(declared_content_type)?;

        let (width, height, format) = ImageProcessor::read_header(data)
            .map_err(|e| ValidationError::NotAnImage(e.to_string()))?;

        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(ValidationError::DimensionsTooLarge {
                width,
                height,
                max: MAX_IMAGE_DIMENSION,
            });
        }

        let sniffed = format
            .and_then(ImageProcessor::content_type_for)
            .ok_or_else(|| ValidationError::InvalidContentType {
                content_type: format
                    .map(|f| format!("{:?}", f))
                    .unwrap_or_else(|| "unknown".to_string()),
                allowed: self.allowed_content_types.clone(),
            })?;
        self.validate_content_type(sniffed)?;

        if !declared_content_type.to_lowercase().starts_with(sniffed) {
            tracing::debug!(
                declared = %declared_content_type,
                sniffed = %sniffed,
                "Declared content type differs from image data"
            );
        }

        Ok(ValidatedImage {
            content_type: sniffed.to_string(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn validator() -> MediaValidator {
        MediaValidator::new(
            2048 * 1024,
            vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/gif".to_string(),
            ],
        )
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255])));
        ImageProcessor::encode(&img, ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_validate_file_size() {
        let validator = validator();
        assert!(validator.validate_file_size(1).is_ok());
        assert!(validator.validate_file_size(2048 * 1024).is_ok());
        assert!(matches!(
            validator.validate_file_size(2048 * 1024 + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_content_type() {
        let validator = validator();
        assert!(validator.validate_content_type("image/PNG").is_ok());
        assert!(validator.validate_content_type("image/jpeg; charset=binary").is_ok());
        assert!(matches!(
            validator.validate_content_type("image/svg+xml"),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_png() {
        let validated = validator().validate(&png(80, 80), "image/png").unwrap();
        assert_eq!(validated.content_type, "image/png");
        assert_eq!((validated.width, validated.height), (80, 80));
    }

    #[test]
    fn test_validate_uses_sniffed_type() {
        let validated = validator().validate(&png(10, 10), "image/jpeg").unwrap();
        assert_eq!(validated.content_type, "image/png");
    }

    #[test]
    fn test_validate_rejects_garbage_as_not_an_image() {
        assert!(matches!(
            validator().validate(b"hello world", "image/png"),
            Err(ValidationError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_dimensions() {
        let data = png(MAX_IMAGE_DIMENSION + 1, 1);
        assert!(data.len() < 2048 * 1024);
        assert!(matches!(
            validator().validate(&data, "image/png"),
            Err(ValidationError::DimensionsTooLarge { width, height: 1, .. })
                if width == MAX_IMAGE_DIMENSION + 1
        ));
    }

    #[test]
    fn test_validate_rejects_disallowed_sniffed_type() {
        let bmp = ImageProcessor::encode(
            &DynamicImage::ImageRgba8(RgbaImage::new(4, 4)),
            ImageFormat::Bmp,
        )
        .unwrap();
        assert!(matches!(
            validator().validate(&bmp, "image/png"),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }
}
