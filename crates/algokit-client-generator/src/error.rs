//! Error types for client generation.

use algokit_app_spec::SpecError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for client generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur while generating a client.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The application specification could not be read or normalized
    #[error("Invalid application spec: {0}")]
    Spec(#[from] SpecError),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A type string that is neither a known special type, a struct nor an ABI type
    #[error("Unknown type `{type_str}` in {location}")]
    UnknownType {
        /// The offending type string
        type_str: String,
        /// Where the type was referenced
        location: String,
    },

    /// A struct reference that does not resolve to a declared struct
    #[error("Unknown struct `{0}`")]
    UnknownStruct(String),

    /// Struct metadata that contradicts the ABI type it annotates
    #[error("Inconsistent struct `{name}`: {reason}")]
    InconsistentStruct {
        /// The struct key
        name: String,
        /// What is inconsistent
        reason: String,
    },

    /// A type used where the target position cannot represent it
    #[error("Type `{type_str}` cannot be used as {position}")]
    InvalidPosition {
        /// The offending type string
        type_str: String,
        /// The position it was used in
        position: &'static str,
    },

    /// A section generator produced an invalid token sequence
    #[error("Render error: {0}")]
    Render(String),

    /// Reading a spec or writing a client failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being read or written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeneratorError {
    /// Creates a new unknown type error
    pub fn unknown_type(type_str: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnknownType {
            type_str: type_str.into(),
            location: location.into(),
        }
    }

    /// Creates a new inconsistent struct error
    pub fn inconsistent_struct(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentStruct {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Creates a new I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error was caused by the input document rather than
    /// by the generator itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Spec(_)
                | Self::Json(_)
                | Self::UnknownType { .. }
                | Self::UnknownStruct(_)
                | Self::InconsistentStruct { .. }
                | Self::InvalidPosition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeneratorError::unknown_type("uint7", "method `add` argument `a`");
        assert_eq!(
            err.to_string(),
            "Unknown type `uint7` in method `add` argument `a`"
        );

        let err = GeneratorError::inconsistent_struct("Vector", "expected 2 fields");
        assert!(err.to_string().contains("Vector"));
    }

    #[test]
    fn test_error_classification() {
        assert!(GeneratorError::UnknownStruct("Point".into()).is_input_error());
        assert!(!GeneratorError::render("dedent below zero").is_input_error());
        assert!(!GeneratorError::Internal("oops".into()).is_input_error());
    }

    #[test]
    fn test_from_spec_error() {
        let err: GeneratorError = SpecError::UnknownSchema("empty".into()).into();
        assert!(matches!(err, GeneratorError::Spec(_)));
        assert!(err.is_input_error());
    }
}
