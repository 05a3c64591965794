use serde::{Deserialize, Serialize};

/// Embedding vector. Its length is fixed per index.
pub type Vector = Vec<f32>;

/// Raw hit from a document store search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub row_id: usize,
    pub document: String,
    /// Squared L2 distance to the query; lower is closer.
    pub distance: f32,
}

/// Search hit annotated with its position in the min-max scaled batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub row_id: usize,
    pub document: String,
    pub distance: f32,
    /// 0.0 is the closest hit in the batch, 1.0 the farthest.
    pub normalized_distance: f32,
}
