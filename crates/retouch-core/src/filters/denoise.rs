//! Non-local means denoising.
//!
//! Every pixel is replaced by a weighted average of the pixels in a search
//! window around it. The weight of a candidate depends on how similar the
//! small template patch around it is to the patch around the pixel being
//! denoised, so texture is preserved while noise averages out.
//!
//! Patch distances are computed per search offset over the whole image and
//! box-summed with an integral image, which keeps the cost proportional to
//! `pixels * search_window^2` regardless of the template size.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::{CancelFlag, TransformError};
use crate::decode::Image;

/// A denoising backend.
pub trait Denoiser: Send + Sync + Debug {
    /// Return a denoised copy of `image` with the same size and format.
    fn denoise(&self, image: &Image) -> Result<Image, TransformError>;

    /// Like [`denoise`](Self::denoise), but gives up with
    /// `TransformError::Cancelled` once `cancel` is raised.
    ///
    /// The default only checks the flag before starting.
    fn denoise_cancellable(
        &self,
        image: &Image,
        cancel: &CancelFlag,
    ) -> Result<Image, TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }
        self.denoise(image)
    }
}

/// Non-local means parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NonLocalMeans {
    /// Filter strength `h`. Larger values remove more noise and more detail.
    pub strength: f64,
    /// Side of the square patch compared between pixels. Must be odd.
    pub template_window: u32,
    /// Side of the square area searched for similar patches. Must be odd.
    pub search_window: u32,
}

impl Default for NonLocalMeans {
    fn default() -> Self {
        Self {
            strength: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

impl NonLocalMeans {
    /// Check that the parameters describe a usable filter.
    pub fn validate(&self) -> Result<(), TransformError> {
        if !self.strength.is_finite() || self.strength <= 0.0 {
            return Err(TransformError::Filter(format!(
                "denoise strength must be positive, got {}",
                self.strength
            )));
        }
        for (name, size) in [
            ("template_window", self.template_window),
            ("search_window", self.search_window),
        ] {
            if size == 0 || size % 2 == 0 {
                return Err(TransformError::Filter(format!(
                    "denoise {name} must be an odd positive size, got {size}"
                )));
            }
        }
        Ok(())
    }
}

impl Denoiser for NonLocalMeans {
    fn denoise(&self, image: &Image) -> Result<Image, TransformError> {
        self.denoise_cancellable(image, &CancelFlag::new())
    }

    /// Checks `cancel` once per search offset.
    fn denoise_cancellable(
        &self,
        image: &Image,
        cancel: &CancelFlag,
    ) -> Result<Image, TransformError> {
        self.validate()?;
        if image.is_empty() {
            return Ok(image.clone());
        }
        if image.pixels.len() != image.pixel_count() * image.format.channels() {
            return Err(TransformError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        }

        let width = image.width as usize;
        let height = image.height as usize;
        let n = width * height;
        let channels = image.format.channels();
        let color = image.format.color_channels();
        let half_template = (self.template_window / 2) as i64;
        let half_search = (self.search_window / 2) as i64;
        let h2 = self.strength * self.strength;

        let value = |idx: usize, c: usize| image.pixels[idx * channels + c] as f64;
        let clamp_x = |x: i64| x.clamp(0, width as i64 - 1) as usize;
        let clamp_y = |y: i64| y.clamp(0, height as i64 - 1) as usize;

        let mut weights = vec![0.0f64; n];
        let mut sums = vec![0.0f64; n * color];
        let mut diff = vec![0.0f64; n];
        let mut integral = vec![0.0f64; (width + 1) * (height + 1)];

        for dy in -half_search..=half_search {
            for dx in -half_search..=half_search {
                if cancel.is_cancelled() {
                    return Err(TransformError::Cancelled);
                }

                // Squared distance between each pixel and its candidate
                for y in 0..height {
                    let qy = clamp_y(y as i64 + dy);
                    for x in 0..width {
                        let p = y * width + x;
                        let q = qy * width + clamp_x(x as i64 + dx);
                        diff[p] = (0..color)
                            .map(|c| {
                                let d = value(p, c) - value(q, c);
                                d * d
                            })
                            .sum();
                    }
                }

                for y in 0..height {
                    let mut row = 0.0;
                    for x in 0..width {
                        row += diff[y * width + x];
                        integral[(y + 1) * (width + 1) + x + 1] =
                            integral[y * (width + 1) + x + 1] + row;
                    }
                }

                for y in 0..height {
                    let y0 = (y as i64 - half_template).max(0) as usize;
                    let y1 = (y as i64 + half_template).min(height as i64 - 1) as usize + 1;
                    let qy = clamp_y(y as i64 + dy);

                    for x in 0..width {
                        let x0 = (x as i64 - half_template).max(0) as usize;
                        let x1 = (x as i64 + half_template).min(width as i64 - 1) as usize + 1;

                        let patch = integral[y1 * (width + 1) + x1]
                            - integral[y0 * (width + 1) + x1]
                            - integral[y1 * (width + 1) + x0]
                            + integral[y0 * (width + 1) + x0];
                        let area = ((y1 - y0) * (x1 - x0) * color) as f64;
                        let weight = (-(patch / area).max(0.0) / h2).exp();

                        let p = y * width + x;
                        let q = qy * width + clamp_x(x as i64 + dx);
                        weights[p] += weight;
                        for c in 0..color {
                            sums[p * color + c] += weight * value(q, c);
                        }
                    }
                }
            }
        }

        let mut output = image.clone();
        for p in 0..n {
            // The zero offset always contributes weight 1
            let total = weights[p];
            for c in 0..color {
                let v = sums[p * color + c] / total;
                output.pixels[p * channels + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(output)
    }
}
