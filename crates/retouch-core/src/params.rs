//! Editing parameters.
//!
//! A [`ParameterSet`] holds every control the editor exposes, grouped the way
//! the controls are laid out: positional (rotate, zoom, flip), color
//! (brightness, grayscale, invert, vibrance) and effect (blur, contrast and the
//! stylistic filter). Each control's default is the identity, and the pipeline
//! skips a control entirely while it sits at its default.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::filters::EffectFilter;
use crate::transform::{compute_rotated_bounds, max_margin, FlipMode};

/// Upper bound for the brightness and vibrance factors.
pub const MAX_ENHANCE_FACTOR: f64 = 5.0;

/// Upper bound for the blur radius.
pub const MAX_BLUR_RADIUS: f64 = 100.0;

/// Upper bound for the contrast factor.
pub const MAX_CONTRAST: u32 = 10;

/// Rotation, zoom and flip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalParams {
    /// Rotation angle in degrees, positive is counter-clockwise.
    pub rotate: f64,
    /// Crop margin in pixels, removed from every side.
    pub zoom: f64,
    pub flip: FlipMode,
}

/// Brightness, grayscale, invert and vibrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /// Brightness factor (0 to 5, 1 is neutral).
    pub brightness: f64,
    pub grayscale: bool,
    pub invert: bool,
    /// Saturation factor against luma (0 to 5, 1 is neutral).
    pub vibrance: f64,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            grayscale: false,
            invert: false,
            vibrance: 1.0,
        }
    }
}

/// Blur, contrast and the stylistic effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Gaussian blur radius in pixels (0 to 100).
    pub blur: f64,
    /// Contrast factor (0 to 10, 1 is neutral).
    pub contrast: u32,
    pub effect: EffectFilter,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            blur: 0.0,
            contrast: 1,
            effect: EffectFilter::None,
        }
    }
}

/// The full set of editing controls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub positional: PositionalParams,
    pub color: ColorParams,
    pub effect: EffectParams,
}

/// Stable hash of a [`ParameterSet`], used to match background results to
/// the parameters that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Hash for ParameterSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let PositionalParams { rotate, zoom, flip } = self.positional;
        let ColorParams {
            brightness,
            grayscale,
            invert,
            vibrance,
        } = self.color;
        let EffectParams {
            blur,
            contrast,
            effect,
        } = self.effect;

        for value in [rotate, zoom, brightness, vibrance, blur] {
            value.to_bits().hash(state);
        }
        flip.hash(state);
        grayscale.hash(state);
        invert.hash(state);
        contrast.hash(state);
        effect.hash(state);
    }
}

impl ParameterSet {
    /// Create a parameter set with every control at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// The effect needs a background recompute.
    pub fn has_heavy_effect(&self) -> bool {
        self.effect.effect.is_heavy()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }

    /// Set the control named by `change`.
    pub fn apply(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::Rotate(v) => self.positional.rotate = v,
            ParameterChange::Zoom(v) => self.positional.zoom = v,
            ParameterChange::Flip(v) => self.positional.flip = v,
            ParameterChange::Brightness(v) => self.color.brightness = v,
            ParameterChange::Grayscale(v) => self.color.grayscale = v,
            ParameterChange::Invert(v) => self.color.invert = v,
            ParameterChange::Vibrance(v) => self.color.vibrance = v,
            ParameterChange::Blur(v) => self.effect.blur = v,
            ParameterChange::Contrast(v) => self.effect.contrast = v,
            ParameterChange::Effect(v) => self.effect.effect = v,
        }
    }

    /// A copy with `change` applied.
    pub fn with_change(mut self, change: ParameterChange) -> Self {
        self.apply(change);
        self
    }

    /// Check every control against its static range.
    ///
    /// The zoom margin can only be fully checked against an image; see
    /// [`ParameterSet::validate_for`].
    pub fn validate(&self) -> Result<(), EditError> {
        if !self.positional.rotate.is_finite() {
            return Err(EditError::invalid(format!(
                "rotate must be finite, got {}",
                self.positional.rotate
            )));
        }
        let zoom = self.positional.zoom;
        if !zoom.is_finite() || zoom < 0.0 {
            return Err(EditError::invalid(format!(
                "zoom margin must be a non-negative number, got {zoom}"
            )));
        }
        check_range(
            "brightness",
            self.color.brightness,
            0.0,
            MAX_ENHANCE_FACTOR,
        )?;
        check_range("vibrance", self.color.vibrance, 0.0, MAX_ENHANCE_FACTOR)?;
        check_range("blur", self.effect.blur, 0.0, MAX_BLUR_RADIUS)?;
        if self.effect.contrast > MAX_CONTRAST {
            return Err(EditError::invalid(format!(
                "contrast must be at most {MAX_CONTRAST}, got {}",
                self.effect.contrast
            )));
        }
        Ok(())
    }

    /// Validate against an original image of `width` x `height`.
    ///
    /// The zoom margin must be smaller than half of the smaller dimension of
    /// the image entering the crop, which is the rotated canvas.
    pub fn validate_for(&self, width: u32, height: u32) -> Result<(), EditError> {
        self.validate()?;

        let zoom = self.positional.zoom;
        if zoom == 0.0 {
            return Ok(());
        }

        let (w, h) = compute_rotated_bounds(width, height, self.positional.rotate);
        let limit = max_margin(w, h);
        if zoom >= limit {
            return Err(EditError::invalid(format!(
                "zoom margin {zoom} must be less than {limit} for a {w}x{h} image"
            )));
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EditError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EditError::invalid(format!("cannot serialize parameters: {e}")))
    }

    /// Parse and validate a parameter set saved with [`ParameterSet::to_json`].
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        let params: ParameterSet = serde_json::from_str(json)
            .map_err(|e| EditError::invalid(format!("cannot parse parameters: {e}")))?;
        params.validate()?;
        Ok(params)
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), EditError> {
    if !value.is_finite() || value < min || value > max {
        return Err(EditError::invalid(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// A single control change: the control and its new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "lowercase")]
pub enum ParameterChange {
    Rotate(f64),
    Zoom(f64),
    Flip(FlipMode),
    Brightness(f64),
    Grayscale(bool),
    Invert(bool),
    Vibrance(f64),
    Blur(f64),
    Contrast(u32),
    Effect(EffectFilter),
}

impl ParameterChange {
    /// Build a change from a control name and its value as text.
    ///
    /// ```ignore
    /// let change = ParameterChange::parse("effect", "Find edges")?;
    /// assert_eq!(change, ParameterChange::Effect(EffectFilter::FindEdges));
    /// ```
    pub fn parse(name: &str, value: &str) -> Result<Self, EditError> {
        let value = value.trim();
        let change = match name.trim().to_ascii_lowercase().as_str() {
            "rotate" => ParameterChange::Rotate(parse_float(name, value)?),
            "zoom" => ParameterChange::Zoom(parse_float(name, value)?),
            "flip" => ParameterChange::Flip(value.parse()?),
            "brightness" => ParameterChange::Brightness(parse_float(name, value)?),
            "grayscale" => ParameterChange::Grayscale(parse_bool(name, value)?),
            "invert" => ParameterChange::Invert(parse_bool(name, value)?),
            "vibrance" => ParameterChange::Vibrance(parse_float(name, value)?),
            "blur" => ParameterChange::Blur(parse_float(name, value)?),
            "contrast" => ParameterChange::Contrast(parse_whole(name, value)?),
            "effect" => ParameterChange::Effect(value.parse()?),
            _ => return Err(EditError::invalid(format!("unknown control '{name}'"))),
        };
        Ok(change)
    }

    /// The control's name as accepted by [`ParameterChange::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            ParameterChange::Rotate(_) => "rotate",
            ParameterChange::Zoom(_) => "zoom",
            ParameterChange::Flip(_) => "flip",
            ParameterChange::Brightness(_) => "brightness",
            ParameterChange::Grayscale(_) => "grayscale",
            ParameterChange::Invert(_) => "invert",
            ParameterChange::Vibrance(_) => "vibrance",
            ParameterChange::Blur(_) => "blur",
            ParameterChange::Contrast(_) => "contrast",
            ParameterChange::Effect(_) => "effect",
        }
    }
}

fn parse_float(name: &str, value: &str) -> Result<f64, EditError> {
    value
        .parse::<f64>()
        .map_err(|_| EditError::invalid(format!("{name}: '{value}' is not a number")))
}

/// Whole numbers, also accepting an integral float such as "3.0" from a slider.
fn parse_whole(name: &str, value: &str) -> Result<u32, EditError> {
    if let Ok(v) = value.parse::<u32>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => Ok(v as u32),
        _ => Err(EditError::invalid(format!(
            "{name}: '{value}' is not a whole number"
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, EditError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(EditError::invalid(format!(
            "{name}: '{value}' is not a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_identity_values() {
        let params = ParameterSet::new();
        assert_eq!(params.positional.rotate, 0.0);
        assert_eq!(params.positional.zoom, 0.0);
        assert_eq!(params.positional.flip, FlipMode::None);
        assert_eq!(params.color.brightness, 1.0);
        assert_eq!(params.color.vibrance, 1.0);
        assert!(!params.color.grayscale);
        assert!(!params.color.invert);
        assert_eq!(params.effect.blur, 0.0);
        assert_eq!(params.effect.contrast, 1);
        assert_eq!(params.effect.effect, EffectFilter::None);
        assert!(params.is_default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_apply_and_is_default() {
        let mut params = ParameterSet::new();
        params.apply(ParameterChange::Grayscale(true));
        assert!(params.color.grayscale);
        assert!(!params.is_default());

        params.apply(ParameterChange::Grayscale(false));
        assert!(params.is_default());
    }

    #[test]
    fn test_validate_ranges() {
        let bad = [
            ParameterChange::Rotate(f64::NAN),
            ParameterChange::Zoom(-1.0),
            ParameterChange::Brightness(5.5),
            ParameterChange::Vibrance(-0.1),
            ParameterChange::Blur(101.0),
            ParameterChange::Contrast(11),
        ];
        for change in bad {
            let params = ParameterSet::new().with_change(change);
            assert!(
                matches!(params.validate(), Err(EditError::InvalidParameter(_))),
                "{:?} should be rejected",
                change
            );
        }

        let good = ParameterSet::new()
            .with_change(ParameterChange::Rotate(-720.0))
            .with_change(ParameterChange::Brightness(5.0))
            .with_change(ParameterChange::Blur(100.0))
            .with_change(ParameterChange::Contrast(10));
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_validate_for_zoom_bound() {
        let params = ParameterSet::new().with_change(ParameterChange::Zoom(50.0));
        // min(100, 200) / 2 = 50
        assert!(params.validate_for(100, 200).is_err());
        assert!(params.validate_for(101, 200).is_ok());
    }

    #[test]
    fn test_validate_for_uses_rotated_canvas() {
        // A 45 degree turn of 100x100 expands the canvas to about 142x142
        let params = ParameterSet::new()
            .with_change(ParameterChange::Zoom(60.0))
            .with_change(ParameterChange::Rotate(45.0));
        assert!(params.validate_for(100, 100).is_ok());
        assert!(params
            .with_change(ParameterChange::Rotate(0.0))
            .validate_for(100, 100)
            .is_err());
    }

    #[test]
    fn test_fingerprint_tracks_every_field() {
        let base = ParameterSet::new();
        let changes = [
            ParameterChange::Rotate(1.0),
            ParameterChange::Zoom(1.0),
            ParameterChange::Flip(FlipMode::Vertical),
            ParameterChange::Brightness(1.5),
            ParameterChange::Grayscale(true),
            ParameterChange::Invert(true),
            ParameterChange::Vibrance(0.5),
            ParameterChange::Blur(2.0),
            ParameterChange::Contrast(3),
            ParameterChange::Effect(EffectFilter::Emboss),
        ];
        for change in changes {
            assert_ne!(
                base.fingerprint(),
                base.with_change(change).fingerprint(),
                "{} not fingerprinted",
                change.name()
            );
        }
        assert_eq!(base.fingerprint(), ParameterSet::new().fingerprint());
    }

    #[test]
    fn test_heavy_effect() {
        let params = ParameterSet::new().with_change(ParameterChange::Effect(EffectFilter::Denoise));
        assert!(params.has_heavy_effect());
        assert!(!ParameterSet::new().has_heavy_effect());
    }

    #[test]
    fn test_parse_changes() {
        assert_eq!(
            ParameterChange::parse("rotate", "-12.5").unwrap(),
            ParameterChange::Rotate(-12.5)
        );
        assert_eq!(
            ParameterChange::parse("flip", "X").unwrap(),
            ParameterChange::Flip(FlipMode::Horizontal)
        );
        assert_eq!(
            ParameterChange::parse("Grayscale", "1").unwrap(),
            ParameterChange::Grayscale(true)
        );
        assert_eq!(
            ParameterChange::parse("contrast", "3.0").unwrap(),
            ParameterChange::Contrast(3)
        );
        assert_eq!(
            ParameterChange::parse("effect", "Remove background").unwrap(),
            ParameterChange::Effect(EffectFilter::RemoveBackground)
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ParameterChange::parse("sharpness", "1").is_err());
        assert!(ParameterChange::parse("blur", "lots").is_err());
        assert!(ParameterChange::parse("contrast", "2.5").is_err());
        assert!(ParameterChange::parse("invert", "maybe").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let params = ParameterSet::new()
            .with_change(ParameterChange::Rotate(90.0))
            .with_change(ParameterChange::Flip(FlipMode::Both))
            .with_change(ParameterChange::Effect(EffectFilter::Contour));

        let json = params.to_json().unwrap();
        assert_eq!(ParameterSet::from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_json_missing_fields_default() {
        let params = ParameterSet::from_json(r#"{"color": {"invert": true}}"#).unwrap();
        assert!(params.color.invert);
        assert_eq!(params.color.brightness, 1.0);
        assert_eq!(params.effect.contrast, 1);
    }

    #[test]
    fn test_json_out_of_range_rejected() {
        let result = ParameterSet::from_json(r#"{"effect": {"blur": 500.0}}"#);
        assert!(matches!(result, Err(EditError::InvalidParameter(_))));
    }
}
