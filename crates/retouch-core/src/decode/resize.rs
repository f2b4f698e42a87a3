//! Image resampling used by the display adapter.
//!
//! Wraps the `image` crate's resize so that every pixel format keeps its
//! channel layout. Returns new `Image` instances without modifying the input.

use super::{DecodeError, FilterType, Image};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for zero target dimensions and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the image size.
pub fn resize(
    image: &Image,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Image, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let dynamic = image
        .to_dynamic()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;

    let resized = dynamic.resize_exact(width, height, filter.to_image_filter());

    Ok(Image::from_dynamic(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelFormat;

    fn create_test_image(width: u32, height: u32) -> Image {
        // Create a simple gradient image for testing
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        Image::new(width, height, PixelFormat::Rgb8, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50, FilterType::Bilinear).unwrap();

        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_upscale() {
        let img = create_test_image(50, 25);
        let resized = resize(&img, 100, 50, FilterType::Lanczos3).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_resize_preserves_alpha_format() {
        let img = Image::filled(40, 20, PixelFormat::Rgba8, &[10, 20, 30, 0]);
        let resized = resize(&img, 20, 10, FilterType::Bilinear).unwrap();

        assert_eq!(resized.format, PixelFormat::Rgba8);
        assert_eq!(resized.pixels.len(), 20 * 10 * 4);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_all_filter_types() {
        let img = create_test_image(100, 50);

        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&img, 50, 25, filter).unwrap();
            assert_eq!(resized.width, 50);
            assert_eq!(resized.height, 25);
        }
    }
}
