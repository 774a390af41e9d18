use thiserror::Error;

/// Errors surfaced by `Document` and `Database`.
///
/// Mirrors `storage::StorageError`'s shape (and subsumes it via `From`) so
/// callers see one error type regardless of which layer actually failed.
#[derive(Debug, Error)]
pub enum RvectorError {
    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("embedding provider failed: {0}")]
    EmbeddingFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<storage::StorageError> for RvectorError {
    fn from(e: storage::StorageError) -> Self {
        match e {
            storage::StorageError::BadArgument(m) => RvectorError::BadArgument(m),
            storage::StorageError::BadFormat(m) => RvectorError::BadFormat(m),
            storage::StorageError::NotFound(m) => RvectorError::NotFound(m),
            storage::StorageError::Io(e) => RvectorError::Io(e),
            storage::StorageError::Internal(m) => RvectorError::Internal(m),
        }
    }
}

impl From<embeddings::EmbeddingError> for RvectorError {
    fn from(e: embeddings::EmbeddingError) -> Self {
        RvectorError::EmbeddingFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RvectorError>;
