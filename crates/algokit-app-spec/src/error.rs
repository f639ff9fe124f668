//! Error types for application specification parsing.

use thiserror::Error;

/// A specialized Result type for specification parsing.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised while reading or normalizing an application specification.
#[derive(Error, Debug)]
pub enum SpecError {
    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document matches neither supported schema
    #[error("Unknown application spec schema: {0}")]
    UnknownSchema(String),

    /// A string could not be parsed as an ABI type
    #[error("Invalid ABI type `{type_str}`: {reason}")]
    InvalidAbiType {
        /// The offending type string
        type_str: String,
        /// Why it was rejected
        reason: String,
    },

    /// ARC-32 hints that contradict each other or the method they annotate
    #[error("Inconsistent ARC-32 hints for `{method}`: {reason}")]
    InconsistentHints {
        /// Signature of the method the hint belongs to
        method: String,
        /// What is inconsistent
        reason: String,
    },

    /// An on-completion or call-config value that is not recognised
    #[error("Invalid call config: {0}")]
    InvalidCallConfig(String),
}

impl SpecError {
    /// Creates a new invalid ABI type error
    pub fn invalid_abi_type(type_str: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAbiType {
            type_str: type_str.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new inconsistent hints error
    pub fn inconsistent_hints(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentHints {
            method: method.into(),
            reason: reason.into(),
        }
    }
}
