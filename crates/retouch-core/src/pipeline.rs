//! The transformation pipeline.
//!
//! The edited image is always rebuilt from the original by replaying every
//! active control in a fixed order:
//!
//! 1. rotate
//! 2. zoom (margin crop)
//! 3. flip
//! 4. brightness
//! 5. vibrance
//! 6. grayscale
//! 7. invert
//! 8. blur
//! 9. contrast
//! 10. effect
//!
//! A control at its default value is skipped, so the default parameter set
//! returns the original pixels untouched.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::adjustments::{
    apply_brightness, apply_contrast, apply_grayscale, apply_invert, apply_vibrance,
};
use crate::config::EditorConfig;
use crate::decode::Image;
use crate::error::EditError;
use crate::filters::{
    apply_blur, apply_kernel, BackgroundRemover, BorderKeyRemover, CancelFlag, Denoiser,
    EffectFilter, NonLocalMeans, TransformError,
};
use crate::params::ParameterSet;
use crate::transform::{apply_flip, apply_margin_crop, apply_rotation, FlipMode, InterpolationFilter};

/// Stateless recompute engine with pluggable heavy filters.
///
/// Cloning is cheap; the filter backends are shared.
#[derive(Debug, Clone)]
pub struct Pipeline {
    interpolation: InterpolationFilter,
    denoiser: Arc<dyn Denoiser>,
    remover: Arc<dyn BackgroundRemover>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            interpolation: InterpolationFilter::default(),
            denoiser: Arc::new(NonLocalMeans::default()),
            remover: Arc::new(BorderKeyRemover::default()),
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from the transform, denoise and background settings.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            interpolation: config.transform.interpolation,
            denoiser: Arc::new(config.denoise),
            remover: Arc::new(config.background),
        }
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationFilter) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Replace the denoising backend.
    pub fn with_denoiser(mut self, denoiser: impl Denoiser + 'static) -> Self {
        self.denoiser = Arc::new(denoiser);
        self
    }

    /// Replace the background removal backend.
    pub fn with_background_remover(mut self, remover: impl BackgroundRemover + 'static) -> Self {
        self.remover = Arc::new(remover);
        self
    }

    /// Rebuild the edited image from `original` and `params`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if a control is out of range, or the zoom margin
    ///   is too large for the (rotated) image. Nothing is computed.
    /// - `TransformFailure` if a filter fails.
    pub fn recompute(&self, original: &Image, params: &ParameterSet) -> Result<Image, EditError> {
        self.recompute_cancellable(original, params, &CancelFlag::new())
    }

    /// [`recompute`](Self::recompute) that stops with
    /// `TransformFailure(Cancelled)` once `cancel` is raised.
    ///
    /// The flag is checked before the effect step and handed to the denoiser.
    pub fn recompute_cancellable(
        &self,
        original: &Image,
        params: &ParameterSet,
        cancel: &CancelFlag,
    ) -> Result<Image, EditError> {
        params.validate_for(original.width, original.height)?;

        let mut image = original.clone();

        let positional = &params.positional;
        if positional.rotate != 0.0 {
            trace!(angle = positional.rotate, "rotate");
            image = apply_rotation(&image, positional.rotate, self.interpolation);
        }
        if positional.zoom != 0.0 {
            trace!(margin = positional.zoom, "zoom");
            image = apply_margin_crop(&image, positional.zoom)?;
        }
        if positional.flip != FlipMode::None {
            trace!(mode = ?positional.flip, "flip");
            image = apply_flip(&image, positional.flip);
        }

        let color = &params.color;
        if color.brightness != 1.0 {
            trace!(factor = color.brightness, "brightness");
            image = apply_brightness(&image, color.brightness);
        }
        if color.vibrance != 1.0 {
            trace!(factor = color.vibrance, "vibrance");
            image = apply_vibrance(&image, color.vibrance);
        }
        if color.grayscale {
            trace!("grayscale");
            image = apply_grayscale(&image);
        }
        if color.invert {
            trace!("invert");
            image = apply_invert(&image);
        }

        let effect = &params.effect;
        if effect.blur != 0.0 {
            trace!(radius = effect.blur, "blur");
            image = apply_blur(&image, effect.blur)?;
        }
        if effect.contrast != 1 {
            trace!(factor = effect.contrast, "contrast");
            image = apply_contrast(&image, effect.contrast as f64);
        }

        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled.into());
        }
        self.apply_effect(image, effect.effect, cancel)
    }

    fn apply_effect(
        &self,
        image: Image,
        effect: EffectFilter,
        cancel: &CancelFlag,
    ) -> Result<Image, EditError> {
        if let Some(kernel) = effect.kernel() {
            trace!(effect = effect.label(), "effect");
            return Ok(apply_kernel(&image, &kernel));
        }

        let started = Instant::now();
        let result = match effect {
            EffectFilter::Denoise => self.denoiser.denoise_cancellable(&image, cancel)?,
            EffectFilter::RemoveBackground => self.remover.remove_background(&image)?,
            _ => return Ok(image),
        };

        debug!(
            effect = effect.label(),
            width = image.width,
            height = image.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Applied heavy effect"
        );

        Ok(result)
    }
}

/// Recompute with the default pipeline.
pub fn recompute(original: &Image, params: &ParameterSet) -> Result<Image, EditError> {
    Pipeline::default().recompute(original, params)
}
