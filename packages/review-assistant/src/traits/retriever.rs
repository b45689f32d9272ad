//! Retriever trait: query text in, ordered context snippets out.
//!
//! The pipeline consumes retrievers opaquely. Ranking, truncation, and
//! deduplication all belong to the implementation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CapabilityResult;

/// Context lookup capability.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return snippets relevant to `query`, most relevant first.
    async fn retrieve(&self, query: &str) -> CapabilityResult<Vec<String>>;

    /// Retriever name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<R: Retriever + ?Sized> Retriever for Arc<R> {
    async fn retrieve(&self, query: &str) -> CapabilityResult<Vec<String>> {
        (**self).retrieve(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
