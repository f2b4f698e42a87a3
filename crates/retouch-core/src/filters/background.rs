//! Background removal.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::Image;

/// A foreground segmentation backend.
///
/// Implementations return an image with an alpha channel in which background
/// pixels are transparent. Rgb8 and Rgba8 input produce Rgba8; Luma8 and
/// LumaA8 input produce LumaA8.
pub trait BackgroundRemover: Send + Sync + Debug {
    fn remove_background(&self, image: &Image) -> Result<Image, TransformError>;
}

/// Color-key background removal.
///
/// The background color is estimated as the mean of the outermost ring of
/// pixels. Every pixel whose color lies within `tolerance` of it (Euclidean
/// distance over the color channels) becomes fully transparent; all others
/// keep their alpha, or become opaque if the input had none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderKeyRemover {
    pub tolerance: f64,
}

impl Default for BorderKeyRemover {
    fn default() -> Self {
        Self { tolerance: 40.0 }
    }
}

impl BorderKeyRemover {
    pub fn validate(&self) -> Result<(), TransformError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TransformError::Filter(format!(
                "background tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Mean color of the border pixels.
    fn border_color(&self, image: &Image) -> Vec<f64> {
        let color = image.format.color_channels();
        let (w, h) = (image.width, image.height);
        let mut sum = vec![0.0f64; color];
        let mut count = 0usize;

        for y in 0..h {
            for x in 0..w {
                if x != 0 && y != 0 && x != w - 1 && y != h - 1 {
                    continue;
                }
                for (c, total) in sum.iter_mut().enumerate() {
                    *total += image.pixel(x, y)[c] as f64;
                }
                count += 1;
            }
        }

        sum.iter().map(|total| total / count as f64).collect()
    }
}

impl BackgroundRemover for BorderKeyRemover {
    fn remove_background(&self, image: &Image) -> Result<Image, TransformError> {
        self.validate()?;
        if image.is_empty()
            || image.pixels.len() != image.pixel_count() * image.format.channels()
        {
            return Err(TransformError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        }

        let key = self.border_color(image);
        let channels = image.format.channels();
        let color = image.format.color_channels();
        let format = image.format.with_alpha();
        let limit = self.tolerance * self.tolerance;

        let mut output = Vec::with_capacity(image.pixel_count() * format.channels());
        for px in image.pixels.chunks_exact(channels) {
            let distance: f64 = px[..color]
                .iter()
                .zip(&key)
                .map(|(&v, &k)| (v as f64 - k).powi(2))
                .sum();

            output.extend_from_slice(&px[..color]);
            output.push(if distance <= limit {
                0
            } else if image.format.has_alpha() {
                px[color]
            } else {
                255
            });
        }

        Ok(Image::new(image.width, image.height, format, output))
    }
}
