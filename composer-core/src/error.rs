//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
///
/// Stale element ids, empty-text pruning and exhausted history are not errors;
/// those operations report "nothing happened" through their return values.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A background or sticker image could not be decoded.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Export was requested while no background image is loaded.
    #[error("Nothing to export: no background image loaded")]
    NoBackground,

    /// Editor configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document or configuration serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The scene renderer failed to flatten the composition.
    #[error("Rendering error: {0}")]
    Render(String),
}
