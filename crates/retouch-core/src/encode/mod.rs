//! Image export for Retouch.
//!
//! This module provides functionality for:
//! - Encoding an [`Image`] to PNG, JPEG, BMP or TIFF
//! - Writing the encoded bytes to `<directory>/<name>.<extension>`
//!
//! The pixel format is preserved. A codec that cannot store the image's
//! channels (alpha in JPEG, gray + alpha in TIFF) is an error, never a silent
//! conversion.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::encode::{export, ExportConfig};
//!
//! let path = export(&image, Path::new("out"), "holiday", "png", &ExportConfig::default())?;
//! println!("Wrote {}", path.display());
//! ```

mod export;
mod jpeg;

pub use export::{encode_image, export, ExportConfig, OutputFormat};
pub use jpeg::{encode_jpeg, DEFAULT_JPEG_QUALITY};

use image::ExtendedColorType;
use thiserror::Error;

use crate::decode::{Image, PixelFormat};

/// Errors that can occur while encoding or writing an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec reported a failure
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// The file extension does not name a supported codec
    #[error("Unsupported file extension '{0}'")]
    UnsupportedExtension(String),

    /// The codec cannot store this pixel format
    #[error("{codec} cannot store {format} images")]
    UnsupportedColorMode {
        codec: &'static str,
        format: PixelFormat,
    },

    /// The output file name is empty or contains a path separator
    #[error("Invalid file name '{0}'")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check dimensions and buffer length before handing pixels to a codec.
fn validate(image: &Image) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = image.pixel_count() * image.format.channels();
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    Ok(())
}

fn color_type(format: PixelFormat) -> ExtendedColorType {
    match format {
        PixelFormat::Luma8 => ExtendedColorType::L8,
        PixelFormat::LumaA8 => ExtendedColorType::La8,
        PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
        PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
    }
}
