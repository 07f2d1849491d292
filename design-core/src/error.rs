//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Layer not found in the document.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// Invalid operation with a user-facing message.
    #[error("{0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The generation backend refused or failed a request.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A generation command was issued without an authenticated principal.
    #[error("Sign in to generate images")]
    Unauthenticated,
}
