use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShareError>;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("insufficient space: {requested} bytes requested, {available} available")]
    InsufficientSpace { requested: u64, available: u64 },

    #[error("unsupported media type: {0:?}")]
    UnsupportedMediaType(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("storage write failed: {0}")]
    StorageWrite(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
