use netinsight_vector_store::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] netinsight_vector_store::VectorStoreError),

    #[error("Empty query")]
    EmptyQuery,
}

impl SearchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::VectorStoreError(err) => err.kind(),
            Self::EmptyQuery => ErrorKind::InvalidInput,
        }
    }
}
