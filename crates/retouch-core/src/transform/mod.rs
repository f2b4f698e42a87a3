//! Geometric transforms: rotation, margin crop ("zoom") and flips.
//!
//! These run first in the edit pipeline, before any color work:
//! 1. Rotation (canvas grows to fit)
//! 2. Zoom (uniform margin crop)
//! 3. Flip
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Crop margins are in pixels of the image entering the crop
//! - Origin is top-left corner

mod crop;
mod flip;
mod rotation;

pub use crop::{apply_margin_crop, max_margin};
pub use flip::{apply_flip, FlipMode};
pub use rotation::{apply_rotation, compute_rotated_bounds, InterpolationFilter};

use crate::decode::Image;

/// Build a `dst_w` x `dst_h` image where each output pixel is copied from the
/// source position returned by `source_of(x, y)`.
fn remap(
    image: &Image,
    dst_w: u32,
    dst_h: u32,
    source_of: impl Fn(u32, u32) -> (u32, u32),
) -> Image {
    let channels = image.format.channels();
    let mut output = Vec::with_capacity(dst_w as usize * dst_h as usize * channels);

    for y in 0..dst_h {
        for x in 0..dst_w {
            let (sx, sy) = source_of(x, y);
            output.extend_from_slice(image.pixel(sx, sy));
        }
    }

    Image::new(dst_w, dst_h, image.format, output)
}
