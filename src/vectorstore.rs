//! Vector store trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend holding embedded [`Chunk`]s with similarity search.
///
/// A store represents a single index. Chunks are keyed by their ID:
/// adding a chunk whose ID is already present replaces it, which makes
/// re-ingesting the same document idempotent rather than duplicating
/// retrieval results.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.add(&chunks).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add chunks to the store, replacing any chunk with the same ID.
    ///
    /// Chunks must have embeddings attached.
    async fn add(&self, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending cosine similarity. Searching
    /// an empty store returns an empty `Vec`, never an error.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// The number of chunks currently stored.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Rank chunks against a query embedding and keep the `top_k` best.
pub(crate) fn rank_chunks<'a, I>(chunks: I, embedding: &[f32], top_k: usize) -> Vec<SearchResult>
where
    I: Iterator<Item = &'a Chunk>,
{
    let mut scored: Vec<SearchResult> = chunks
        .map(|chunk| SearchResult {
            chunk: chunk.clone(),
            score: cosine_similarity(&chunk.embedding, embedding),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored
}
