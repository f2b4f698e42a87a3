//! Display fitting.
//!
//! Computes the largest placement of an image inside a display area that
//! keeps the image's aspect ratio, and produces the scaled copy shown to the
//! user. With `r = width / height` and `ar = area_width / area_height`:
//!
//! - `ar > r` (area is wider): the height fills the area and the width is
//!   `round(area_height * r)`
//! - otherwise: the width fills the area and the height is
//!   `round(area_width / r)`

use tracing::trace;

use crate::decode::{resize, FilterType, Image};
use crate::error::EditError;
use crate::filters::TransformError;

/// Where and how large the image is placed inside the display area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub area_width: u32,
    pub area_height: u32,
    /// Width divided by height of the image being placed.
    pub image_ratio: f64,
    pub placement_width: u32,
    pub placement_height: u32,
}

impl DisplayGeometry {
    /// Top-left corner of the placement when centered in the area.
    pub fn offset(&self) -> (u32, u32) {
        (
            (self.area_width - self.placement_width) / 2,
            (self.area_height - self.placement_height) / 2,
        )
    }
}

/// A display-ready copy of the edited image.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub geometry: DisplayGeometry,
    pub image: Image,
}

/// Compute the aspect-preserving placement of a `width` x `height` image in
/// an `area_width` x `area_height` display area.
///
/// Placement sizes are at least 1 pixel and never exceed the area.
///
/// # Errors
///
/// Returns `EditError::InvalidParameter` if the area or the image is empty.
///
/// # Example
///
/// ```
/// use retouch_core::display::fit_geometry;
///
/// let geometry = fit_geometry(1600, 900, 800, 600).unwrap();
/// assert_eq!((geometry.placement_width, geometry.placement_height), (800, 450));
/// ```
pub fn fit_geometry(
    width: u32,
    height: u32,
    area_width: u32,
    area_height: u32,
) -> Result<DisplayGeometry, EditError> {
    if area_width == 0 || area_height == 0 {
        return Err(EditError::invalid(format!(
            "display area must be non-empty, got {area_width}x{area_height}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(EditError::invalid(format!(
            "cannot display an empty {width}x{height} image"
        )));
    }

    let ratio = width as f64 / height as f64;
    let area_ratio = area_width as f64 / area_height as f64;

    let (placement_width, placement_height) = if area_ratio > ratio {
        let w = (area_height as f64 * ratio).round() as u32;
        (w, area_height)
    } else {
        let h = (area_width as f64 / ratio).round() as u32;
        (area_width, h)
    };

    Ok(DisplayGeometry {
        area_width,
        area_height,
        image_ratio: ratio,
        placement_width: placement_width.clamp(1, area_width),
        placement_height: placement_height.clamp(1, area_height),
    })
}

/// Scale `image` to its fitted placement inside the display area.
pub fn fit(
    image: &Image,
    area_width: u32,
    area_height: u32,
    filter: FilterType,
) -> Result<DisplayFrame, EditError> {
    let geometry = fit_geometry(image.width, image.height, area_width, area_height)?;

    let scaled = resize(
        image,
        geometry.placement_width,
        geometry.placement_height,
        filter,
    )
    .map_err(|_| TransformError::InvalidDimensions {
        width: image.width,
        height: image.height,
    })?;

    trace!(
        area_width,
        area_height,
        width = geometry.placement_width,
        height = geometry.placement_height,
        "Fitted image to display area"
    );

    Ok(DisplayFrame {
        geometry,
        image: scaled,
    })
}
