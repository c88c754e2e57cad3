//! Image processor - decoding, metadata extraction and format detection

use avatar_core::constants::{MAX_DECODE_ALLOC_BYTES, MAX_IMAGE_DIMENSION};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use serde::Serialize;
use std::io::Cursor;

/// Image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Format as sniffed from the file's magic bytes.
    pub format: String,
    pub size_bytes: u64,
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode image bytes, guessing the format from content rather than trusting
    /// the declared content type.
    ///
    /// Images wider or taller than `MAX_IMAGE_DIMENSION` are refused before any
    /// pixel buffer is allocated.
    pub fn decode(data: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), anyhow::Error> {
        let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        reader.limits(Self::decode_limits());
        let format = reader.format();
        let img = reader.decode()?;
        Ok((img, format))
    }

    /// Read format and dimensions from the image header only.
    pub fn read_header(data: &[u8]) -> Result<(u32, u32, Option<ImageFormat>), anyhow::Error> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader.format();
        let (width, height) = reader.into_dimensions()?;
        Ok((width, height, format))
    }

    pub fn decode_limits() -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
        limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
        limits.max_alloc = Some(MAX_DECODE_ALLOC_BYTES);
        limits
    }

    pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata, anyhow::Error> {
        let (img, format) = Self::decode(data)?;
        let (width, height) = img.dimensions();

        Ok(ImageMetadata {
            width,
            height,
            format: format
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "unknown".to_string()),
            size_bytes: data.len() as u64,
        })
    }

    pub fn get_dimensions(data: &[u8]) -> Option<(u32, u32)> {
        Self::decode(data).ok().map(|(img, _)| img.dimensions())
    }

    /// Sniff the content type from magic bytes without decoding pixel data.
    pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
        let format = image::guess_format(data).ok()?;
        Self::content_type_for(format)
    }

    /// Map a content type to the encoder format. Returns `None` for anything that
    /// is not one of the supported raster formats.
    pub fn detect_format(content_type: &str) -> Option<ImageFormat> {
        match content_type.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::WebP),
            "image/bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn content_type_for(format: ImageFormat) -> Option<&'static str> {
        match format {
            ImageFormat::Jpeg => Some("image/jpeg"),
            ImageFormat::Png => Some("image/png"),
            ImageFormat::Gif => Some("image/gif"),
            ImageFormat::WebP => Some("image/webp"),
            ImageFormat::Bmp => Some("image/bmp"),
            _ => None,
        }
    }

    /// Encode `img` in `format`. JPEG has no alpha channel, so it is flattened to RGB first.
    pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity((width * height * 3) as usize);
        let mut cursor = Cursor::new(&mut buffer);

        match format {
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut cursor, format)?
            }
            _ => DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut cursor, format)?,
        }

        Ok(buffer)
    }
}
