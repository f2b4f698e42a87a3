//! Gaussian blur.

use super::TransformError;
use crate::decode::Image;

/// Gaussian blur with standard deviation equal to `radius` pixels.
///
/// A radius of zero (or less) returns the image unchanged. All channels,
/// alpha included, are blurred so soft edges stay soft.
pub fn apply_blur(image: &Image, radius: f64) -> Result<Image, TransformError> {
    if radius <= 0.0 || image.is_empty() {
        return Ok(image.clone());
    }

    let dynamic = image
        .to_dynamic()
        .ok_or(TransformError::InvalidDimensions {
            width: image.width,
            height: image.height,
        })?;

    Ok(Image::from_dynamic(dynamic.blur(radius as f32)))
}
