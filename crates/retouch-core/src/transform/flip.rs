//! Mirror and flip operations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::remap;
use crate::decode::Image;
use crate::error::EditError;

/// Which axes to flip the image across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlipMode {
    /// Leave the image as is.
    #[default]
    None,
    /// Mirror left to right.
    Horizontal,
    /// Flip top to bottom.
    Vertical,
    /// Mirror and flip (same as a 180 degree rotation).
    Both,
}

impl FlipMode {
    fn mirrors(self) -> bool {
        matches!(self, FlipMode::Horizontal | FlipMode::Both)
    }

    fn flips(self) -> bool {
        matches!(self, FlipMode::Vertical | FlipMode::Both)
    }
}

impl FromStr for FlipMode {
    type Err = EditError;

    /// Accepts the control labels `None`, `X`, `Y`, `Both` as well as the
    /// variant names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FlipMode::None),
            "x" | "horizontal" => Ok(FlipMode::Horizontal),
            "y" | "vertical" => Ok(FlipMode::Vertical),
            "both" => Ok(FlipMode::Both),
            _ => Err(EditError::InvalidParameter(format!(
                "unknown flip mode '{s}'"
            ))),
        }
    }
}

/// Flip an image according to `mode`. `FlipMode::None` returns a copy.
pub fn apply_flip(image: &Image, mode: FlipMode) -> Image {
    if mode == FlipMode::None {
        return image.clone();
    }

    let (w, h) = (image.width, image.height);
    let (mirror, flip) = (mode.mirrors(), mode.flips());

    remap(image, w, h, |x, y| {
        let sx = if mirror { w - 1 - x } else { x };
        let sy = if flip { h - 1 - y } else { y };
        (sx, sy)
    })
}
