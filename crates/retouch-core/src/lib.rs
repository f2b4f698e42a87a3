//! Retouch Core - Image editing library
//!
//! This crate provides the core of the Retouch photo editor: a deterministic
//! pipeline that rebuilds the edited image from the imported original every
//! time a parameter changes, the display fitting that scales it into the
//! window, and import/export of common raster formats.
//!
//! The GUI layer is not part of this crate. It drives an
//! [`EditorSession`] with parameter changes, resize events and import/export
//! requests, and renders [`EditorSession::display_frame`].

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod display;
pub mod encode;
pub mod error;
pub mod filters;
pub mod luminance;
pub mod params;
pub mod pipeline;
pub mod session;
pub mod transform;
pub mod worker;

pub use config::{ConfigError, EditorConfig};
pub use decode::{Image, PixelFormat};
pub use display::{fit, fit_geometry, DisplayFrame, DisplayGeometry};
pub use error::EditError;
pub use filters::{BackgroundRemover, Denoiser, EffectFilter};
pub use params::{Fingerprint, ParameterChange, ParameterSet};
pub use pipeline::{recompute, Pipeline};
pub use session::{EditorSession, RecomputeStatus};
pub use transform::FlipMode;
