//! Query-time retrieval: embed a query, search the store.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{AskdocError, Result};
use crate::vectorstore::VectorStore;

/// Retrieves the chunks most similar to a free-text query.
///
/// Pairs an [`EmbeddingProvider`] with a [`VectorStore`]: the query text is
/// embedded with the same model that embedded the chunks, then the store is
/// searched for the top-k nearest neighbors. `k` is caller-configured per
/// request, not a constant.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Create a retriever over the given embedder and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve up to `k` chunks ranked by descending similarity to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocError::Pipeline`] if query embedding or the store
    /// search fails.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        debug!(query_len = query.len(), k, "retrieving");

        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            AskdocError::Pipeline(format!("query embedding failed: {e}"))
        })?;

        let results = self.store.search(&query_embedding, k).await.map_err(|e| {
            error!(error = %e, "vector store search failed");
            AskdocError::Pipeline(format!("search failed: {e}"))
        })?;

        debug!(result_count = results.len(), "retrieval complete");
        Ok(results)
    }
}
