//! Directory-backed vector store that survives process restarts.
//!
//! [`PersistentVectorStore`] keeps the full index in memory and mirrors it
//! to a single JSON file inside a caller-chosen directory. Writes go to a
//! temporary file first and are renamed into place, so a failed write can
//! never leave a torn index on disk.
//!
//! Opening a directory that has no index file is a distinct condition
//! ([`AskdocError::IndexNotFound`]) from opening an index that exists but
//! is empty; callers use the former to trigger a build and the latter to
//! report that nothing matched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{AskdocError, Result};
use crate::vectorstore::{VectorStore, rank_chunks};

/// File name of the serialized index inside the store directory.
const INDEX_FILE: &str = "index.json";

/// On-disk representation of the index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    /// Embedding dimensionality every stored chunk must match.
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// A vector store persisted as a JSON index file in a directory.
///
/// Chunks are keyed by ID; adding a chunk with an existing ID replaces it.
/// The in-memory map is only updated after the new index has been written
/// to disk, so an I/O failure leaves both the file and the live store
/// unchanged.
#[derive(Debug)]
pub struct PersistentVectorStore {
    dir: PathBuf,
    dimensions: usize,
    chunks: RwLock<HashMap<String, Chunk>>,
}

impl PersistentVectorStore {
    /// Whether a persisted index exists under `dir`.
    pub fn exists(dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(INDEX_FILE).exists()
    }

    /// Create a new empty index at `dir` for embeddings of the given
    /// dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocError::Store`] if an index already exists at `dir`
    /// or the directory/index file cannot be written.
    pub async fn create(dir: impl AsRef<Path>, dimensions: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if Self::exists(&dir) {
            return Err(store_error(format!(
                "index already exists at '{}'; open it instead",
                dir.display()
            )));
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| store_error(format!("failed to create '{}': {e}", dir.display())))?;

        let store = Self { dir, dimensions, chunks: RwLock::new(HashMap::new()) };
        store.flush(&HashMap::new()).await?;

        info!(dir = %store.dir.display(), dimensions, "created persistent index");
        Ok(store)
    }

    /// Open an existing index at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocError::IndexNotFound`] if no index file exists at
    /// `dir`, and [`AskdocError::Store`] if the file cannot be read or
    /// parsed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(INDEX_FILE);

        if !path.exists() {
            return Err(AskdocError::IndexNotFound { path: dir.display().to_string() });
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| store_error(format!("failed to read '{}': {e}", path.display())))?;
        let index: IndexFile = serde_json::from_slice(&bytes)
            .map_err(|e| store_error(format!("corrupt index file '{}': {e}", path.display())))?;

        let chunks: HashMap<String, Chunk> =
            index.chunks.into_iter().map(|c| (c.id.clone(), c)).collect();

        info!(
            dir = %dir.display(),
            dimensions = index.dimensions,
            chunk_count = chunks.len(),
            "opened persistent index"
        );

        Ok(Self { dir, dimensions: index.dimensions, chunks: RwLock::new(chunks) })
    }

    /// Open the index at `dir`, creating an empty one if none exists.
    pub async fn open_or_create(dir: impl AsRef<Path>, dimensions: usize) -> Result<Self> {
        if Self::exists(&dir) {
            Self::open(dir).await
        } else {
            Self::create(dir, dimensions).await
        }
    }

    /// The directory this store persists to.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The embedding dimensionality this store accepts.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Write the given chunk map to disk via a temp file and rename.
    async fn flush(&self, chunks: &HashMap<String, Chunk>) -> Result<()> {
        let index =
            IndexFile { dimensions: self.dimensions, chunks: chunks.values().cloned().collect() };
        let bytes = serde_json::to_vec(&index)
            .map_err(|e| store_error(format!("failed to serialize index: {e}")))?;

        let path = self.dir.join(INDEX_FILE);
        let tmp = self.dir.join(format!("{INDEX_FILE}.tmp"));

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| store_error(format!("failed to write '{}': {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| store_error(format!("failed to commit '{}': {e}", path.display())))?;

        debug!(path = %path.display(), chunk_count = index.chunks.len(), "flushed index");
        Ok(())
    }
}

fn store_error(message: String) -> AskdocError {
    AskdocError::Store { backend: "persistent".into(), message }
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn add(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(store_error(format!(
                    "chunk '{}' has embedding dimension {} but the index expects {}",
                    chunk.id,
                    chunk.embedding.len(),
                    self.dimensions
                )));
            }
        }

        let mut store = self.chunks.write().await;

        // Build the next state, persist it, then commit in memory. If the
        // flush fails, neither the file nor the live map has changed.
        let mut next = store.clone();
        for chunk in chunks {
            next.insert(chunk.id.clone(), chunk.clone());
        }
        self.flush(&next).await?;
        *store = next;

        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let store = self.chunks.read().await;
        Ok(rank_chunks(store.values(), embedding, top_k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }
}
