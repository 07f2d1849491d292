//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while compositing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image source could not be loaded.
    #[error("Failed to load asset: {0}")]
    AssetLoad(String),

    /// The SVG intermediate could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterization or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Filesystem error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
