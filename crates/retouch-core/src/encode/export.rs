//! Codec selection and writing exported files.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::jpeg::{encode_jpeg, DEFAULT_JPEG_QUALITY};
use super::{color_type, validate, EncodeError};
use crate::decode::{Image, PixelFormat};

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A supported output codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Pick the codec for a file extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self, EncodeError> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            _ => Err(EncodeError::UnsupportedExtension(extension.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Tiff => "TIFF",
        }
    }

    /// Whether the codec can store `format` without losing channels.
    pub fn supports(self, format: PixelFormat) -> bool {
        match self {
            OutputFormat::Png | OutputFormat::Bmp => true,
            OutputFormat::Jpeg => !format.has_alpha(),
            OutputFormat::Tiff => format != PixelFormat::LumaA8,
        }
    }
}

/// Encode `image` in memory with the given codec.
pub fn encode_image(
    image: &Image,
    format: OutputFormat,
    config: &ExportConfig,
) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    if !format.supports(image.format) {
        return Err(EncodeError::UnsupportedColorMode {
            codec: format.name(),
            format: image.format,
        });
    }

    let (w, h, color) = (image.width, image.height, color_type(image.format));
    let mut buffer = Cursor::new(Vec::new());

    let result = match format {
        OutputFormat::Jpeg => return encode_jpeg(image, config.jpeg_quality),
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(&image.pixels, w, h, color),
        OutputFormat::Bmp => BmpEncoder::new(&mut buffer).write_image(&image.pixels, w, h, color),
        OutputFormat::Tiff => TiffEncoder::new(&mut buffer).write_image(&image.pixels, w, h, color),
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode `image` and write it to `<directory>/<name>.<extension>`.
///
/// The extension selects the codec. The directory must already exist; an
/// existing file with the same name is replaced.
///
/// # Returns
///
/// The path of the written file.
pub fn export(
    image: &Image,
    directory: &Path,
    name: &str,
    extension: &str,
    config: &ExportConfig,
) -> Result<PathBuf, EncodeError> {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return Err(EncodeError::InvalidFileName(name.to_string()));
    }

    let format = OutputFormat::from_extension(extension)?;
    let bytes = encode_image(image, format, config)?;

    let path = directory.join(format!("{}.{}", name, extension.trim_start_matches('.')));
    fs::write(&path, &bytes)?;

    info!(
        path = %path.display(),
        codec = format.name(),
        bytes = bytes.len(),
        "Exported image"
    );

    Ok(path)
}
