//! 3x3 convolution filters.
//!
//! Each output channel is `sum(kernel * neighborhood) / scale + offset`,
//! clamped to 0..=255. Pixels outside the image are taken from the nearest
//! edge. Alpha is never convolved.

use crate::decode::Image;

/// A 3x3 convolution kernel with its normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    /// Weights in row-major order.
    pub weights: [i32; 9],
    /// Divisor applied to the weighted sum.
    pub scale: i32,
    /// Constant added after scaling.
    pub offset: i32,
}

impl Kernel {
    /// Relief effect: difference with the upper-left neighbor, around mid gray.
    pub const EMBOSS: Kernel = Kernel {
        weights: [-1, 0, 0, 0, 1, 0, 0, 0, 0],
        scale: 1,
        offset: 128,
    };

    /// Laplacian edge detector; flat regions go black.
    pub const FIND_EDGES: Kernel = Kernel {
        weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
        scale: 1,
        offset: 0,
    };

    /// Laplacian offset to white, so edges show as dark lines on white.
    pub const CONTOUR: Kernel = Kernel {
        weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
        scale: 1,
        offset: 255,
    };

    /// Mild sharpening: the pixel plus half its Laplacian.
    pub const EDGE_ENHANCE: Kernel = Kernel {
        weights: [-1, -1, -1, -1, 10, -1, -1, -1, -1],
        scale: 2,
        offset: 0,
    };
}

/// Convolve the color channels of `image` with `kernel`.
pub fn apply_kernel(image: &Image, kernel: &Kernel) -> Image {
    let mut output = image.clone();
    if image.is_empty() {
        return output;
    }

    let channels = image.format.channels();
    let color = image.format.color_channels();
    let width = image.width as usize;
    let max_x = image.width as i64 - 1;
    let max_y = image.height as i64 - 1;
    let scale = kernel.scale.max(1);

    for y in 0..image.height as i64 {
        for x in 0..image.width as i64 {
            let dst = (y as usize * width + x as usize) * channels;

            for c in 0..color {
                let mut sum = 0i32;
                for (k, weight) in kernel.weights.iter().enumerate() {
                    if *weight == 0 {
                        continue;
                    }
                    let sx = (x + k as i64 % 3 - 1).clamp(0, max_x) as usize;
                    let sy = (y + k as i64 / 3 - 1).clamp(0, max_y) as usize;
                    sum += weight * image.pixels[(sy * width + sx) * channels + c] as i32;
                }
                output.pixels[dst + c] = (sum / scale + kernel.offset).clamp(0, 255) as u8;
            }
        }
    }

    output
}
