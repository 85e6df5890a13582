//! Renderer error types.

use composer_core::EditorError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG could not be parsed back for rasterization.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Pixel buffer allocation failed.
    #[error("Failed to create {0}x{1} pixmap")]
    Pixmap(u32, u32),

    /// Encoding the raster output failed.
    #[error("{format} encoding failed: {reason}")]
    Encode {
        /// Output format being written.
        format: &'static str,
        /// Encoder message.
        reason: String,
    },

    /// The format needs a feature this build lacks.
    #[error("Export format {0} is not available in this build")]
    Unsupported(&'static str),
}

impl From<RenderError> for EditorError {
    fn from(err: RenderError) -> Self {
        Self::Render(err.to_string())
    }
}
