//! Core raster types shared by decoding, transforms and export.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Interleaved 8-bit pixel layout of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Single luma channel.
    Luma8,
    /// Luma plus alpha.
    LumaA8,
    /// Red, green, blue.
    Rgb8,
    /// Red, green, blue, alpha.
    Rgba8,
}

impl PixelFormat {
    /// Number of interleaved bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::LumaA8 => 2,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Number of color (non-alpha) channels.
    #[inline]
    pub fn color_channels(self) -> usize {
        if self.has_alpha() {
            self.channels() - 1
        } else {
            self.channels()
        }
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::LumaA8 | PixelFormat::Rgba8)
    }

    #[inline]
    pub fn is_luma(self) -> bool {
        matches!(self, PixelFormat::Luma8 | PixelFormat::LumaA8)
    }

    /// The luma format with the same alpha presence.
    pub fn to_luma(self) -> PixelFormat {
        if self.has_alpha() {
            PixelFormat::LumaA8
        } else {
            PixelFormat::Luma8
        }
    }

    /// The format with an alpha channel added (identity if already present).
    pub fn with_alpha(self) -> PixelFormat {
        match self {
            PixelFormat::Luma8 | PixelFormat::LumaA8 => PixelFormat::LumaA8,
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => PixelFormat::Rgba8,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelFormat::Luma8 => "L8",
            PixelFormat::LumaA8 => "LA8",
            PixelFormat::Rgb8 => "RGB8",
            PixelFormat::Rgba8 => "RGBA8",
        };
        f.write_str(name)
    }
}

/// An 8-bit raster image with interleaved channels.
///
/// Treated as immutable by convention: every transform returns a new `Image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channel layout of `pixels`.
    pub format: PixelFormat,
    /// Pixel data in row-major order.
    /// Length should be width * height * format.channels().
    pub pixels: Vec<u8>,
}

impl Image {
    /// Create a new Image with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * format.channels(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Create an image filled with a single pixel value.
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: &[u8]) -> Self {
        debug_assert_eq!(value.len(), format.channels());
        let pixels = value
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * format.channels())
            .collect();
        Self::new(width, height, format, pixels)
    }

    /// Create an Image from any decoded `DynamicImage`.
    ///
    /// Higher bit depths are narrowed to 8 bits; the channel layout (and in
    /// particular the alpha channel) is kept.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(buf) => Self::from_luma(buf),
            DynamicImage::ImageLumaA8(buf) => Self::from_luma_alpha(buf),
            DynamicImage::ImageRgb8(buf) => Self::from_rgb_image(buf),
            DynamicImage::ImageRgba8(buf) => Self::from_rgba_image(buf),
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (false, false) => Self::from_luma(other.into_luma8()),
                    (false, true) => Self::from_luma_alpha(other.into_luma_alpha8()),
                    (true, false) => Self::from_rgb_image(other.into_rgb8()),
                    (true, true) => Self::from_rgba_image(other.into_rgba8()),
                }
            }
        }
    }

    /// Create an Image from an image::RgbImage.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Rgb8, img.into_raw())
    }

    /// Create an Image from an image::RgbaImage.
    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Rgba8, img.into_raw())
    }

    fn from_luma(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Luma8, img.into_raw())
    }

    fn from_luma_alpha(img: GrayAlphaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::LumaA8, img.into_raw())
    }

    /// Convert to a `DynamicImage` for codec and resampling work.
    ///
    /// Returns `None` if the pixel buffer does not match the dimensions.
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        let (w, h, px) = (self.width, self.height, self.pixels.clone());
        let img = match self.format {
            PixelFormat::Luma8 => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, px)?),
            PixelFormat::LumaA8 => {
                DynamicImage::ImageLumaA8(GrayAlphaImage::from_raw(w, h, px)?)
            }
            PixelFormat::Rgb8 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, px)?),
            PixelFormat::Rgba8 => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, px)?),
        };
        Some(img)
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Whether the buffer holds exactly `width * height * channels` bytes.
    pub fn has_consistent_buffer(&self) -> bool {
        self.pixels.len() == self.pixel_count() * self.format.channels()
    }

    /// Slice of the pixel at (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.format.channels();
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.pixels[idx..idx + c]
    }
}
