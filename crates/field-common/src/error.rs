//! Error types for field rendering.

use thiserror::Error;

use crate::field::Shape;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Primary error type for field rendering operations.
#[derive(Debug, Error)]
pub enum FieldError {
    // === Input Errors ===
    #[error("cannot infer {0} from empty input")]
    EmptyInput(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // === Rendering Errors ===
    #[error("Font error: {0}")]
    Font(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl FieldError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        FieldError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// the rendering backend.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FieldError::EmptyInput(_)
                | FieldError::ShapeMismatch { .. }
                | FieldError::InvalidParameter { .. }
                | FieldError::UnknownColormap(_)
                | FieldError::Config(_)
        )
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::Config(format!("JSON error: {}", err))
    }
}
