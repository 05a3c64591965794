use crate::error::{Result, SearchError};
use crate::optimizer::QueryOptimizer;
use crate::prompt::join_context;
use netinsight_vector_store::{DocumentStore, RankedResult, SearchResult};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DEFAULT_SEARCH_K: usize = 5;
pub const DEFAULT_CONTEXT_K: usize = 3;

/// Shared query surface over one [`DocumentStore`].
///
/// Clones share the same store. Mutations take the write lock for their whole
/// duration (embedding included); searches and saves share the read lock.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<RwLock<DocumentStore>>,
    optimizer: QueryOptimizer,
}

impl SearchService {
    #[must_use]
    pub fn new(store: DocumentStore) -> Self {
        Self::with_optimizer(store, QueryOptimizer::default())
    }

    #[must_use]
    pub fn with_optimizer(store: DocumentStore, optimizer: QueryOptimizer) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            optimizer,
        }
    }

    /// Raw nearest `k` hits with their squared L2 distances.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let store = self.store.read().await;
        Ok(store.search(query, k).await?)
    }

    /// Search and rank: the store's nearest `k` hits, min-max normalized.
    pub async fn optimize_query(&self, query: &str, k: usize) -> Result<Vec<RankedResult>> {
        let results = self.search(query, k).await?;
        Ok(self.optimizer.optimize(results))
    }

    /// Top `k` documents joined into a single context block.
    pub async fn get_context(&self, query: &str, k: usize) -> Result<String> {
        let ranked = self.optimize_query(query, k).await?;
        log::debug!("Context for '{query}' built from {} documents", ranked.len());
        Ok(join_context(&ranked))
    }

    pub async fn add_documents(&self, texts: Vec<String>) -> Result<()> {
        let mut store = self.store.write().await;
        store.add_documents(texts).await?;
        Ok(())
    }

    pub async fn save(
        &self,
        index_path: impl AsRef<Path>,
        documents_path: impl AsRef<Path>,
    ) -> Result<()> {
        let store = self.store.read().await;
        store.save(index_path, documents_path).await?;
        Ok(())
    }

    /// Swap in persisted state. A failed reload leaves the current state serving.
    pub async fn reload(
        &self,
        index_path: impl AsRef<Path>,
        documents_path: impl AsRef<Path>,
    ) -> Result<()> {
        let mut store = self.store.write().await;
        store.load(index_path, documents_path).await?;
        Ok(())
    }

    pub async fn document_count(&self) -> usize {
        self.store.read().await.len()
    }
}
