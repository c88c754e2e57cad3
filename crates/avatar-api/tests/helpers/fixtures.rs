//! Test fixtures: encoded images and multipart forms.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Solid-color image of the given size, encoded in `format`.
pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    create_test_image(width, height, ImageFormat::Png)
}

/// Form with a single `avatar` file part.
pub fn avatar_form(data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "avatar",
        Part::bytes(data).file_name(file_name).mime_type(mime_type),
    )
}

pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}
