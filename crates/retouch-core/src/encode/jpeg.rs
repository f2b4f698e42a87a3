//! JPEG encoding for export.
//!
//! Uses the `image` crate's baseline JPEG encoder. JPEG has no alpha channel,
//! so only Luma8 and Rgb8 images are accepted; anything with alpha is refused
//! instead of being silently flattened.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::ImageEncoder;

use super::{color_type, validate, EncodeError};
use crate::decode::Image;

/// Quality used when nothing else is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encode an image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - A Luma8 or Rgb8 image
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
///
/// # Example
///
/// ```
/// use retouch_core::decode::{Image, PixelFormat};
/// use retouch_core::encode::encode_jpeg;
///
/// let image = Image::filled(100, 100, PixelFormat::Rgb8, &[128, 128, 128]);
/// let jpeg = encode_jpeg(&image, 90).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    if image.format.has_alpha() {
        return Err(EncodeError::UnsupportedColorMode {
            codec: "JPEG",
            format: image.format,
        });
    }

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            color_type(image.format),
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
