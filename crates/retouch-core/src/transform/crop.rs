//! Uniform margin cropping, the editor's "zoom" control.
//!
//! The same number of pixels is removed from all four sides. The margin is
//! given in pixels of the image entering the crop, so after a rotation it
//! applies to the expanded canvas.

use crate::decode::Image;
use crate::error::EditError;

/// Largest margin (exclusive) that still leaves at least one pixel.
///
/// A margin must be strictly smaller than half of the smaller dimension.
pub fn max_margin(width: u32, height: u32) -> f64 {
    width.min(height) as f64 / 2.0
}

/// Crop `margin` pixels from every side of the image.
///
/// The margin is rounded to whole pixels. A margin of zero returns a copy.
///
/// # Errors
///
/// Returns `EditError::InvalidParameter` if the margin is negative, not
/// finite, or at least half of the smaller image dimension (which would
/// produce an empty or negative-size image).
///
/// # Example
///
/// ```
/// use retouch_core::decode::{Image, PixelFormat};
/// use retouch_core::transform::apply_margin_crop;
///
/// let image = Image::filled(100, 60, PixelFormat::Rgb8, &[128, 128, 128]);
/// let cropped = apply_margin_crop(&image, 10.0).unwrap();
/// assert_eq!((cropped.width, cropped.height), (80, 40));
/// ```
pub fn apply_margin_crop(image: &Image, margin: f64) -> Result<Image, EditError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(EditError::InvalidParameter(format!(
            "zoom margin must be a non-negative number, got {margin}"
        )));
    }

    let limit = max_margin(image.width, image.height);
    if margin >= limit {
        return Err(EditError::InvalidParameter(format!(
            "zoom margin {margin} must be less than {limit} for a {}x{} image",
            image.width, image.height
        )));
    }

    let px = margin.round() as u32;
    if px == 0 {
        return Ok(image.clone());
    }

    // Rounding up to the limit must not empty the image
    let px = px.min((image.width.min(image.height) - 1) / 2);

    let out_width = image.width - 2 * px;
    let out_height = image.height - 2 * px;
    let channels = image.format.channels();
    let row_bytes = out_width as usize * channels;

    let mut output = Vec::with_capacity(out_height as usize * row_bytes);

    // Copy pixel data row by row
    for y in 0..out_height {
        let src_y = (px + y) as usize;
        let start = (src_y * image.width as usize + px as usize) * channels;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Ok(Image::new(out_width, out_height, image.format, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelFormat;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> Image {
        let pixels = (0..width * height)
            .map(|i| (i % 256) as u8)
            .collect::<Vec<u8>>();
        Image::new(width, height, PixelFormat::Luma8, pixels)
    }

    #[test]
    fn test_zero_margin_is_copy() {
        let img = test_image(10, 10);
        assert_eq!(apply_margin_crop(&img, 0.0).unwrap(), img);
    }

    #[test]
    fn test_margin_crop_dimensions() {
        let img = test_image(100, 60);
        let result = apply_margin_crop(&img, 10.0).unwrap();

        assert_eq!(result.width, 80);
        assert_eq!(result.height, 40);
        assert_eq!(result.pixels.len(), 80 * 40);
    }

    #[test]
    fn test_margin_crop_content() {
        let img = test_image(10, 10);
        let result = apply_margin_crop(&img, 2.0).unwrap();

        assert_eq!((result.width, result.height), (6, 6));
        // First pixel comes from (2, 2): 2 * 10 + 2 = 22
        assert_eq!(result.pixels[0], 22);
        // Last pixel comes from (7, 7): 77
        assert_eq!(*result.pixels.last().unwrap(), 77);
    }

    #[test]
    fn test_margin_is_rounded() {
        let img = test_image(20, 20);
        let result = apply_margin_crop(&img, 2.6).unwrap();
        assert_eq!(result.width, 14);
    }

    #[test]
    fn test_margin_keeps_alpha() {
        let img = Image::filled(8, 8, PixelFormat::Rgba8, &[1, 2, 3, 4]);
        let result = apply_margin_crop(&img, 1.0).unwrap();

        assert_eq!(result.format, PixelFormat::Rgba8);
        assert_eq!(result.pixel(0, 0), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_margin_at_half_rejected() {
        let img = test_image(100, 40);
        assert!(matches!(
            apply_margin_crop(&img, 20.0),
            Err(EditError::InvalidParameter(_))
        ));
        assert!(apply_margin_crop(&img, 250.0).is_err());
    }

    #[test]
    fn test_margin_just_below_half_leaves_a_pixel() {
        let img = test_image(10, 10);
        let result = apply_margin_crop(&img, 4.9).unwrap();
        assert!(result.width >= 1 && result.height >= 1);
    }

    #[test]
    fn test_negative_and_nan_margin_rejected() {
        let img = test_image(10, 10);
        assert!(apply_margin_crop(&img, -1.0).is_err());
        assert!(apply_margin_crop(&img, f64::NAN).is_err());
        assert!(apply_margin_crop(&img, f64::INFINITY).is_err());
    }

    #[test]
    fn test_max_margin() {
        assert_eq!(max_margin(100, 40), 20.0);
        assert_eq!(max_margin(7, 9), 3.5);
    }
}
