//! Color adjustment algorithms.
//!
//! Brightness, vibrance and contrast are all "enhance" operations: the image
//! is blended with a degenerate version of itself,
//!
//! ```text
//! output = degenerate + (input - degenerate) * factor
//! ```
//!
//! so a factor of 1.0 reproduces the input, 0.0 yields the degenerate image and
//! values above 1.0 push away from it.
//!
//! | adjustment | degenerate image |
//! |---|---|
//! | brightness | black |
//! | vibrance | the luma (grayscale) version of the pixel |
//! | contrast | flat gray at the image's mean luma |
//!
//! Alpha channels are never modified by these operations.

use crate::decode::Image;
use crate::luminance::{luma_u8, pixel_luma};

/// Apply `f` to the color channels of every pixel, leaving alpha untouched.
fn map_color(image: &Image, f: impl Fn(&mut [u8])) -> Image {
    let channels = image.format.channels();
    let color = image.format.color_channels();
    let mut output = image.clone();

    for chunk in output.pixels.chunks_exact_mut(channels) {
        f(&mut chunk[..color]);
    }

    output
}

/// Blend a single channel value away from `degenerate` by `factor`.
#[inline]
fn enhance(value: u8, degenerate: f64, factor: f64) -> u8 {
    let v = degenerate + (value as f64 - degenerate) * factor;
    v.clamp(0.0, 255.0).round() as u8
}

/// Scale brightness: `output = input * factor`.
///
/// # Example
/// ```
/// use retouch_core::adjustments::apply_brightness;
/// use retouch_core::decode::{Image, PixelFormat};
///
/// let image = Image::filled(1, 1, PixelFormat::Rgb8, &[64, 64, 64]);
/// let brighter = apply_brightness(&image, 2.0);
/// assert_eq!(brighter.pixels, vec![128, 128, 128]);
/// ```
pub fn apply_brightness(image: &Image, factor: f64) -> Image {
    map_color(image, |px| {
        for v in px.iter_mut() {
            *v = enhance(*v, 0.0, factor);
        }
    })
}

/// Scale color saturation against each pixel's luma.
///
/// Luma formats carry no color, so they are returned unchanged.
pub fn apply_vibrance(image: &Image, factor: f64) -> Image {
    if image.format.is_luma() {
        return image.clone();
    }

    map_color(image, |px| {
        let gray = luma_u8(px[0], px[1], px[2]) as f64;
        for v in px.iter_mut() {
            *v = enhance(*v, gray, factor);
        }
    })
}

/// Desaturate fully, converting to a luma format.
///
/// Rgb8 becomes Luma8 and Rgba8 becomes LumaA8; the alpha channel is kept.
/// Luma images are returned unchanged.
pub fn apply_grayscale(image: &Image) -> Image {
    if image.format.is_luma() {
        return image.clone();
    }

    let has_alpha = image.format.has_alpha();
    let format = image.format.to_luma();
    let mut output = Vec::with_capacity(image.pixel_count() * format.channels());

    for chunk in image.pixels.chunks_exact(image.format.channels()) {
        output.push(luma_u8(chunk[0], chunk[1], chunk[2]));
        if has_alpha {
            output.push(chunk[3]);
        }
    }

    Image::new(image.width, image.height, format, output)
}

/// Complement every color channel: `output = 255 - input`.
pub fn apply_invert(image: &Image) -> Image {
    map_color(image, |px| {
        for v in px.iter_mut() {
            *v = 255 - *v;
        }
    })
}

/// Scale contrast around the image's mean luma.
pub fn apply_contrast(image: &Image, factor: f64) -> Image {
    let mean = mean_luma(image) as f64;

    map_color(image, |px| {
        for v in px.iter_mut() {
            *v = enhance(*v, mean, factor);
        }
    })
}

/// Mean luma over all pixels, rounded to the nearest integer.
pub fn mean_luma(image: &Image) -> u8 {
    let count = image.pixel_count() as u64;
    if count == 0 {
        return 0;
    }

    let color = image.format.color_channels();
    let sum: u64 = image
        .pixels
        .chunks_exact(image.format.channels())
        .map(|px| pixel_luma(px, color) as u64)
        .sum();

    ((sum + count / 2) / count) as u8
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decode::PixelFormat;
    use proptest::prelude::*;

    fn rgba_strategy() -> impl Strategy<Value = Image> {
        (1u32..=10, 1u32..=10).prop_flat_map(|(w, h)| {
            let len = (w * h * 4) as usize;
            prop::collection::vec(any::<u8>(), len..=len)
                .prop_map(move |pixels| Image::new(w, h, PixelFormat::Rgba8, pixels))
        })
    }

    proptest! {
        /// Inverting twice restores the image.
        #[test]
        fn prop_invert_is_involution(image in rgba_strategy()) {
            prop_assert_eq!(apply_invert(&apply_invert(&image)), image);
        }

        /// No color adjustment touches alpha.
        #[test]
        fn prop_alpha_untouched(image in rgba_strategy(), factor in 0.0f64..=5.0) {
            let alpha: Vec<u8> = image.pixels.iter().skip(3).step_by(4).copied().collect();
            for result in [
                apply_brightness(&image, factor),
                apply_vibrance(&image, factor),
                apply_contrast(&image, factor),
                apply_invert(&image),
            ] {
                let result_alpha: Vec<u8> = result.pixels.iter().skip(3).step_by(4).copied().collect();
                prop_assert_eq!(&result_alpha, &alpha);
            }
        }

        /// A factor of one is the identity for every enhance operation.
        #[test]
        fn prop_unit_factor_is_identity(image in rgba_strategy()) {
            prop_assert_eq!(apply_brightness(&image, 1.0), image.clone());
            prop_assert_eq!(apply_vibrance(&image, 1.0), image.clone());
            prop_assert_eq!(apply_contrast(&image, 1.0), image);
        }
    }
}
