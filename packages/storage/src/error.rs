use thiserror::Error;

/// Errors surfaced by the storage engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::BadFormat(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
