//! Editor configuration loaded from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Unknown keys are rejected.
//!
//! ```toml
//! [display]
//! filter = "lanczos3"
//!
//! [export]
//! jpeg_quality = 85
//!
//! [denoise]
//! strength = 12.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::encode::ExportConfig;
use crate::filters::{BorderKeyRemover, NonLocalMeans};
use crate::transform::InterpolationFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Display scaling.
    pub display: DisplayConfig,
    /// Geometric transforms.
    pub transform: TransformConfig,
    /// File export.
    pub export: ExportConfig,
    /// Parameters of the built-in denoiser.
    pub denoise: NonLocalMeans,
    /// Parameters of the built-in background remover.
    pub background: BorderKeyRemover,
    /// Background recompute of heavy effects.
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Resampling filter for the display copy.
    pub filter: FilterType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Interpolation for rotations that are not quarter turns.
    pub interpolation: InterpolationFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    /// Run denoise and background removal on a background thread.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl EditorConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::Validation(
                "export.jpeg_quality must be 1-100".into(),
            ));
        }
        self.denoise
            .validate()
            .map_err(|e| ConfigError::Validation(format!("denoise: {e}")))?;
        self.background
            .validate()
            .map_err(|e| ConfigError::Validation(format!("background: {e}")))?;
        Ok(())
    }
}
