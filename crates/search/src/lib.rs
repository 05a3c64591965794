mod error;
mod optimizer;
mod prompt;
mod service;

pub use error::{Result, SearchError};
pub use optimizer::{QueryOptimizer, DEFAULT_EPSILON};
pub use prompt::{build_prompt, join_context};
pub use service::{SearchService, DEFAULT_CONTEXT_K, DEFAULT_SEARCH_K};
