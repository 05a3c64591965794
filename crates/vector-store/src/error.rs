use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index dimension must be positive")]
    ZeroDimension,

    #[error("Vector contains a non-finite component at position {position}")]
    NonFiniteVector { position: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied something unusable (4xx).
    InvalidInput,
    /// A persisted artifact is missing.
    NotFound,
    /// The embedding capability failed or is unreachable.
    Unavailable,
    /// Persisted artifacts are unreadable or disagree with each other.
    CorruptData,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_request",
            Self::NotFound => "not_found",
            Self::Unavailable => "embedding_unavailable",
            Self::CorruptData => "corrupt_data",
            Self::Internal => "internal",
        }
    }
}

impl VectorStoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DimensionMismatch { .. }
            | Self::ZeroDimension
            | Self::NonFiniteVector { .. }
            | Self::InvalidArgument(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EmbeddingError(_) => ErrorKind::Unavailable,
            Self::CorruptData(_) | Self::SerializationError(_) => ErrorKind::CorruptData,
            Self::IoError(_) => ErrorKind::Internal,
        }
    }
}
