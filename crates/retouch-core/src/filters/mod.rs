//! Effect filters: blur, stylistic convolutions, denoising and background
//! removal.
//!
//! The cheap filters (blur and the 3x3 kernels) are plain functions. The two
//! heavy operations sit behind traits, [`Denoiser`] and [`BackgroundRemover`],
//! so the pipeline can be given a different backend (a segmentation model, an
//! external denoiser) without changing how it is called. The crate ships one
//! implementation of each: [`NonLocalMeans`] and [`BorderKeyRemover`].

mod background;
mod blur;
mod cancel;
mod denoise;
mod kernel;

pub use background::{BackgroundRemover, BorderKeyRemover};
pub use blur::apply_blur;
pub use cancel::CancelFlag;
pub use denoise::{Denoiser, NonLocalMeans};
pub use kernel::{apply_kernel, Kernel};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::PixelFormat;
use crate::error::EditError;

/// Errors raised by an individual filter.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The filter cannot work on this pixel format.
    #[error("{operation} does not support {format} images")]
    UnsupportedFormat {
        operation: &'static str,
        format: PixelFormat,
    },

    /// The image is empty or its buffer does not match its dimensions.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The filter itself failed.
    #[error("Filter failed: {0}")]
    Filter(String),

    /// The caller raised the [`CancelFlag`] before the filter finished.
    #[error("Filter cancelled")]
    Cancelled,
}

/// The single stylistic effect applied last in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EffectFilter {
    #[default]
    None,
    Emboss,
    FindEdges,
    Contour,
    EdgeEnhance,
    /// Multi-pass denoising; heavy.
    Denoise,
    /// Foreground segmentation with a transparent background; heavy.
    RemoveBackground,
}

impl EffectFilter {
    /// Heavy effects are candidates for background execution.
    pub fn is_heavy(self) -> bool {
        matches!(self, EffectFilter::Denoise | EffectFilter::RemoveBackground)
    }

    /// The convolution kernel for the stylistic filters.
    pub fn kernel(self) -> Option<Kernel> {
        match self {
            EffectFilter::Emboss => Some(Kernel::EMBOSS),
            EffectFilter::FindEdges => Some(Kernel::FIND_EDGES),
            EffectFilter::Contour => Some(Kernel::CONTOUR),
            EffectFilter::EdgeEnhance => Some(Kernel::EDGE_ENHANCE),
            _ => None,
        }
    }

    /// Human-readable label, as shown on the effect selector.
    pub fn label(self) -> &'static str {
        match self {
            EffectFilter::None => "None",
            EffectFilter::Emboss => "Emboss",
            EffectFilter::FindEdges => "Find edges",
            EffectFilter::Contour => "Contour",
            EffectFilter::EdgeEnhance => "Edge enhance",
            EffectFilter::Denoise => "Denoise",
            EffectFilter::RemoveBackground => "Remove background",
        }
    }
}

impl FromStr for EffectFilter {
    type Err = EditError;

    /// Accepts selector labels ("Find edges") and variant names ("FindEdges"),
    /// ignoring case, spaces and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "none" => Ok(EffectFilter::None),
            "emboss" => Ok(EffectFilter::Emboss),
            "findedges" => Ok(EffectFilter::FindEdges),
            "contour" => Ok(EffectFilter::Contour),
            "edgeenhance" => Ok(EffectFilter::EdgeEnhance),
            "denoise" => Ok(EffectFilter::Denoise),
            "removebackground" => Ok(EffectFilter::RemoveBackground),
            _ => Err(EditError::invalid(format!("unknown effect '{s}'"))),
        }
    }
}
