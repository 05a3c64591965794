use crate::embedder::HttpEmbedder;
use anyhow::{anyhow, Context as AnyhowContext, Result};
use netinsight_vector_store::{DocumentStore, Embedder, StubEmbedder, VectorStoreError};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_DIMENSION: usize = 384;
pub const DEFAULT_INDEX_PATH: &str = "netinsight_index.bin";
pub const DEFAULT_DOCS_PATH: &str = "netinsight_docs.json";

pub const ENV_DIMENSION: &str = "NETINSIGHT_DIMENSION";
pub const ENV_INDEX_PATH: &str = "NETINSIGHT_INDEX_PATH";
pub const ENV_DOCS_PATH: &str = "NETINSIGHT_DOCS_PATH";
pub const ENV_EMBEDDING_MODE: &str = "NETINSIGHT_EMBEDDING_MODE";
pub const ENV_EMBEDDING_URL: &str = "NETINSIGHT_EMBEDDING_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingConfig {
    Stub,
    Http { url: String },
}

/// Everything needed to build or open a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dimension: usize,
    pub index_path: PathBuf,
    pub docs_path: PathBuf,
    pub embedding: EmbeddingConfig,
}

/// Raw, possibly-unset settings as they arrive from flags.
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub dimension: Option<usize>,
    pub index_path: Option<PathBuf>,
    pub docs_path: Option<PathBuf>,
    pub embed_mode: Option<String>,
    pub embed_url: Option<String>,
}

impl StoreConfig {
    /// Flags win over `NETINSIGHT_*` variables, which win over defaults.
    pub fn resolve(overrides: StoreOverrides) -> Result<Self> {
        let dimension = match overrides.dimension {
            Some(dimension) => dimension,
            None => match env::var(ENV_DIMENSION) {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {ENV_DIMENSION} '{raw}'"))?,
                Err(_) => DEFAULT_DIMENSION,
            },
        };
        if dimension == 0 {
            return Err(anyhow!("Embedding dimension must be positive"));
        }

        let index_path = overrides
            .index_path
            .or_else(|| env::var(ENV_INDEX_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH));
        let docs_path = overrides
            .docs_path
            .or_else(|| env::var(ENV_DOCS_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_PATH));

        let mode = overrides
            .embed_mode
            .or_else(|| env::var(ENV_EMBEDDING_MODE).ok())
            .unwrap_or_else(|| "stub".to_string())
            .to_ascii_lowercase();
        let embedding = match mode.as_str() {
            "stub" => EmbeddingConfig::Stub,
            "http" => {
                let url = overrides
                    .embed_url
                    .or_else(|| env::var(ENV_EMBEDDING_URL).ok())
                    .ok_or_else(|| {
                        anyhow!("Embedding mode 'http' requires --embed-url or {ENV_EMBEDDING_URL}")
                    })?;
                EmbeddingConfig::Http { url }
            }
            other => {
                return Err(anyhow!(
                    "Unsupported embedding mode '{other}' (expected 'stub' or 'http')"
                ))
            }
        };

        Ok(Self {
            dimension,
            index_path,
            docs_path,
            embedding,
        })
    }

    #[must_use]
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        match &self.embedding {
            EmbeddingConfig::Stub => Arc::new(StubEmbedder::new(self.dimension)),
            EmbeddingConfig::Http { url } => Arc::new(HttpEmbedder::new(url.clone(), self.dimension)),
        }
    }

    pub fn empty_store(&self) -> Result<DocumentStore> {
        Ok(DocumentStore::new(self.dimension, self.embedder())?)
    }

    /// Load the persisted store, explaining how to build it when it is missing.
    pub async fn open_store(&self) -> Result<DocumentStore> {
        match DocumentStore::open(
            self.dimension,
            self.embedder(),
            &self.index_path,
            &self.docs_path,
        )
        .await
        {
            Ok(store) => Ok(store),
            Err(err @ VectorStoreError::NotFound(_)) => Err(anyhow::Error::new(err).context(
                format!(
                    "Index not found at {} / {}; run `netinsight index` first",
                    self.index_path.display(),
                    self.docs_path.display()
                ),
            )),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to load index")),
        }
    }
}
