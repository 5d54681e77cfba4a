use odml_tree::TreeError;

/// Errors from reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or a record that does not fit the document schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record violates a tree invariant (bad name or type).
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result alias for reader and writer operations.
pub type IoResult<T> = Result<T, IoError>;
