//! Luma calculation using ITU-R BT.601 weights.
//!
//! This is the classic RGB to grayscale conversion used by most image
//! libraries. Grayscale, vibrance and contrast all measure against it so the
//! three stay consistent with each other.

/// ITU-R BT.601 weight for the red channel, in thousandths.
pub const LUMA_R: u32 = 299;

/// ITU-R BT.601 weight for the green channel, in thousandths.
pub const LUMA_G: u32 = 587;

/// ITU-R BT.601 weight for the blue channel, in thousandths.
pub const LUMA_B: u32 = 114;

/// Calculate luma from u8 RGB values (0 to 255).
///
/// Integer arithmetic with rounding, so identical inputs always give
/// identical outputs on every platform.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((sum + 500) / 1000) as u8
}

/// Luma of a pixel slice in any format: the first channel for luma formats,
/// the weighted RGB sum otherwise.
#[inline]
pub fn pixel_luma(pixel: &[u8], color_channels: usize) -> u8 {
    if color_channels >= 3 {
        luma_u8(pixel[0], pixel[1], pixel[2])
    } else {
        pixel[0]
    }
}
