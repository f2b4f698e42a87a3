//! Top-level error type for editor operations.
//!
//! Every failure here is recoverable at the call boundary; none of them
//! leave an [`EditorSession`](crate::session::EditorSession) half-updated.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::filters::TransformError;

/// Errors surfaced by the pipeline, display adapter and editor session.
#[derive(Debug, Error)]
pub enum EditError {
    /// A parameter value was rejected; the previous value stays in effect.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The imported file could not be read or decoded.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(#[from] DecodeError),

    /// A filter failed while recomputing the edited image.
    #[error("Transform failed: {0}")]
    TransformFailure(#[from] TransformError),

    /// The edited image could not be written.
    #[error("Export failed: {0}")]
    ExportFailure(#[from] EncodeError),

    /// The operation needs an imported image.
    #[error("No image has been imported")]
    NoImage,
}

impl EditError {
    /// Shorthand for an `InvalidParameter` error.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidParameter(message.into())
    }
}
