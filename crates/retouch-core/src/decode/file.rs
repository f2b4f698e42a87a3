//! Raster file decoding with EXIF orientation handling.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use tracing::{debug, info};

use super::{DecodeError, Image, Orientation};

/// Read and decode an image file from disk.
///
/// The container format is guessed from the file content, not the extension.
/// EXIF orientation is applied when the container carries it.
///
/// # Errors
///
/// Returns `DecodeError::IoError` if the file cannot be read and
/// `DecodeError::CorruptedFile` if it cannot be decoded.
pub fn open(path: &Path) -> Result<Image, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::IoError(e.to_string()))?;
    let image = decode_image(&bytes)?;
    info!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        format = %image.format,
        "imported image"
    );
    Ok(image)
}

/// Decode image bytes in any supported container, applying EXIF orientation.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the container is not recognized.
/// Returns `DecodeError::CorruptedFile` if the data is corrupted.
pub fn decode_image(bytes: &[u8]) -> Result<Image, DecodeError> {
    // Orientation first; it lives in the raw container, not the pixels
    let orientation = extract_orientation(bytes);

    let img = decode_dynamic(bytes)?;
    if orientation != Orientation::Normal {
        debug!(?orientation, "applying EXIF orientation");
    }

    Ok(Image::from_dynamic(apply_orientation(img, orientation)))
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Extract EXIF orientation from container bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
