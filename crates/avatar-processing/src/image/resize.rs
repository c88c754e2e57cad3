use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        if (orig_width, orig_height) == (width, height) {
            return img.clone();
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Largest centered square of `img`. Square input is returned unchanged.
    pub fn center_square(img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width == height {
            return img.clone();
        }
        let side = width.min(height);
        let x = (width - side) / 2;
        let y = (height - side) / 2;
        img.crop_imm(x, y, side, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])))
    }

    #[test]
    fn test_select_filter() {
        assert_eq!(ImageResize::select_filter(400, 400, 40, 40), FilterType::Triangle);
        assert_eq!(ImageResize::select_filter(130, 130, 80, 80), FilterType::CatmullRom);
        assert_eq!(ImageResize::select_filter(80, 80, 160, 160), FilterType::Lanczos3);
    }

    #[test]
    fn test_resize_image_exact() {
        let resized = ImageResize::resize_image(&image(80, 80), 160, 160);
        assert_eq!(resized.dimensions(), (160, 160));
    }

    #[test]
    fn test_center_square_landscape_and_portrait() {
        let landscape = ImageResize::center_square(&image(200, 100));
        assert_eq!(landscape.dimensions(), (100, 100));

        let portrait = ImageResize::center_square(&image(30, 90));
        assert_eq!(portrait.dimensions(), (30, 30));

        let square = ImageResize::center_square(&image(50, 50));
        assert_eq!(square.dimensions(), (50, 50));
    }
}
