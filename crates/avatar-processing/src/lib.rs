//! Avatar Processing Library
//!
//! Image handling for avatars:
//! - `crop`: square crop of a user-selected region, encoded as PNG
//! - `conversion`: the fixed 40x40 / 80x80 / 160x160 variant set
//! - `image`: decoding, metadata and resize helpers
//! - `validator`: upload size and content-type checks

pub mod conversion;
pub mod crop;
pub mod image;
pub mod validator;

pub use conversion::{ConversionError, ConversionPipeline, GeneratedVariant, VariantGenerator};
pub use crop::{CropEngine, CropError, CropRect, CropSelection};
pub use image::{ImageMetadata, ImageProcessor, ImageResize};
pub use validator::{MediaValidator, ValidatedImage, ValidationError};
