use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::VectorIndex;
use crate::persistence;
use crate::types::SearchResult;
use std::path::Path;
use std::sync::Arc;

/// Documents paired 1:1, by row id, with their vectors in a [`VectorIndex`].
///
/// Mutating calls take `&mut self`; callers sharing a store across tasks wrap
/// it in a lock so that searches never observe a half-applied batch.
pub struct DocumentStore {
    index: VectorIndex,
    documents: Vec<String>,
    embedder: Arc<dyn Embedder>,
}

impl DocumentStore {
    pub fn new(dimension: usize, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let index = VectorIndex::new(dimension)?;
        if embedder.dimension() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: embedder.dimension(),
            });
        }
        log::debug!("Initializing DocumentStore (dimension {dimension})");
        Ok(Self {
            index,
            documents: Vec::new(),
            embedder,
        })
    }

    /// `new` followed by `load`.
    pub async fn open(
        dimension: usize,
        embedder: Arc<dyn Embedder>,
        index_path: impl AsRef<Path>,
        documents_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut store = Self::new(dimension, embedder)?;
        store.load(index_path, documents_path).await?;
        Ok(store)
    }

    /// Embed and append documents. The batch commits as a whole or not at all.
    pub async fn add_documents(&mut self, texts: Vec<String>) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }

        log::info!("Adding {} documents to store", texts.len());

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&refs).await?;
        if vectors.len() != texts.len() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }

        self.index.add(&vectors)?;
        self.documents.extend(texts);

        log::info!("Successfully added documents. Total: {}", self.documents.len());
        Ok(())
    }

    /// Nearest documents to `query`, closest first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(VectorStoreError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        log::debug!("Searching for: '{query}' (k: {k})");

        let query_vector = self.embedder.embed(query).await?;
        let neighbors = self.index.search(&query_vector, k)?;

        let results = neighbors
            .into_iter()
            .map(|(row_id, distance)| {
                let document = self.documents.get(row_id).ok_or_else(|| {
                    VectorStoreError::CorruptData(format!("row {row_id} has no document"))
                })?;
                Ok(SearchResult {
                    row_id,
                    document: document.clone(),
                    distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Found {} results", results.len());
        Ok(results)
    }

    pub async fn save(
        &self,
        index_path: impl AsRef<Path>,
        documents_path: impl AsRef<Path>,
    ) -> Result<()> {
        let index_path = index_path.as_ref();
        let documents_path = documents_path.as_ref();
        log::info!(
            "Saving DocumentStore to {:?} and {:?}",
            index_path,
            documents_path
        );

        let document_bytes = persistence::encode_documents(&self.documents)?;
        let documents_crc = persistence::documents_checksum(&document_bytes);
        let index_bytes = persistence::encode_index(&self.index, documents_crc)?;
        persistence::write_atomic(index_path, &index_bytes).await?;
        persistence::write_atomic(documents_path, &document_bytes).await?;

        log::info!("DocumentStore saved ({} documents)", self.documents.len());
        Ok(())
    }

    /// Replace the whole state from disk. On any error the store is unchanged.
    pub async fn load(
        &mut self,
        index_path: impl AsRef<Path>,
        documents_path: impl AsRef<Path>,
    ) -> Result<()> {
        let index_path = index_path.as_ref();
        let documents_path = documents_path.as_ref();
        log::info!(
            "Loading DocumentStore from {:?} and {:?}",
            index_path,
            documents_path
        );

        let index_bytes = persistence::read_artifact(index_path).await?;
        let document_bytes = persistence::read_artifact(documents_path).await?;

        let persistence::DecodedIndex {
            index,
            documents_crc,
        } = persistence::decode_index(&index_bytes)?;
        let documents = persistence::decode_documents(&document_bytes)?;

        if index.dimension() != self.dimension() {
            log::warn!("Rejecting {:?}: dimension {}", index_path, index.dimension());
            return Err(VectorStoreError::CorruptData(format!(
                "index dimension {} does not match store dimension {}",
                index.dimension(),
                self.dimension()
            )));
        }
        if index.len() != documents.len() {
            log::warn!(
                "Rejecting {:?}: {} vectors for {} documents",
                index_path,
                index.len(),
                documents.len()
            );
            return Err(VectorStoreError::CorruptData(format!(
                "index holds {} vectors but documents artifact holds {}",
                index.len(),
                documents.len()
            )));
        }

        if persistence::documents_checksum(&document_bytes) != documents_crc {
            log::warn!(
                "Rejecting {:?}: documents artifact {:?} was not saved with it",
                index_path,
                documents_path
            );
            return Err(VectorStoreError::CorruptData(format!(
                "documents artifact {} does not belong to index {}",
                documents_path.display(),
                index_path.display()
            )));
        }

        self.index = index;
        self.documents = documents;

        log::info!("Loaded {} documents", self.documents.len());
        Ok(())
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn document(&self, row_id: usize) -> Option<&str> {
        self.documents.get(row_id).map(String::as_str)
    }

    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    #[must_use]
    pub const fn index(&self) -> &VectorIndex {
        &self.index
    }
}
