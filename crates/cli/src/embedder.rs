use async_trait::async_trait;
use netinsight_vector_store::{Embedder, Result, Vector, VectorStoreError};
use reqwest::Client;
use serde::Serialize;

/// Embedder backed by a remote embedding service.
///
/// Sends `POST {url}` with `{"inputs": [...]}` and expects a JSON array of
/// vectors, one per input.
pub struct HttpEmbedder {
    client: Client,
    url: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl HttpEmbedder {
    #[must_use]
    pub fn new(url: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        log::debug!("Embedding {} texts via {}", texts.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                VectorStoreError::EmbeddingError(format!("{} unavailable: {e}", self.url))
            })?;

        response.json::<Vec<Vector>>().await.map_err(|e| {
            VectorStoreError::EmbeddingError(format!("{} returned malformed vectors: {e}", self.url))
        })
    }
}
