//! Image processing module
//!
//! - Metadata extraction and format detection (processor)
//! - Square cropping and resizing (resize)

pub mod processor;
pub mod resize;

pub use processor::{ImageMetadata, ImageProcessor};
pub use resize::ImageResize;
