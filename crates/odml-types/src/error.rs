use thiserror::Error;

use crate::kind::ValueKind;

/// Errors produced while typing, coercing, or encoding a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The content cannot be represented as the declared kind.
    #[error("declared type {declared} does not accept {found} content {content:?}")]
    Mismatch {
        declared: ValueKind,
        found: ValueKind,
        content: String,
    },

    #[error("invalid {kind} literal: {text:?}")]
    InvalidLiteral { kind: ValueKind, text: String },

    #[error("tuple arity mismatch: expected {expected} components, got {actual}")]
    TupleArity { expected: usize, actual: usize },

    #[error("binary source error: {0}")]
    Binary(String),

    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedChecksum(String),

    #[error("malformed checksum: {0:?}")]
    MalformedChecksum(String),
}

/// Convenience alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
