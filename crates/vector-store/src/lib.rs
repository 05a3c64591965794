//! # NetInsight Vector Store
//!
//! Exact nearest-neighbor storage for runbook embeddings.
//!
//! ## Architecture
//!
//! ```text
//! Runbook sections
//!     │
//!     ├──> Embedder (injected)
//!     │      └─> Vector[dimension]
//!     │
//!     ├──> VectorIndex (flat, row-major)
//!     │      └─> Exhaustive squared-L2 search
//!     │
//!     └──> Persistent Storage
//!            ├─> index.bin  (binary, CRC32)
//!            └─> docs.json  (versioned JSON)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use netinsight_vector_store::{DocumentStore, StubEmbedder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> netinsight_vector_store::Result<()> {
//!     let mut store = DocumentStore::new(384, Arc::new(StubEmbedder::new(384)))?;
//!
//!     store
//!         .add_documents(vec!["## Pod failures\nCheck events.".to_string()])
//!         .await?;
//!     store.save("index.bin", "docs.json").await?;
//!
//!     for result in store.search("pod keeps restarting", 5).await? {
//!         println!("{:.3}: {}", result.distance, result.document);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod flat_index;
mod persistence;
mod store;
mod types;

pub use embeddings::{Embedder, StubEmbedder};
pub use error::{ErrorKind, Result, VectorStoreError};
pub use flat_index::{l2_distance_squared, VectorIndex};
pub use persistence::DOCUMENTS_SCHEMA_VERSION;
pub use store::DocumentStore;
pub use types::{RankedResult, SearchResult, Vector};
