//! Local embedding provider backed by `fastembed`.
//!
//! This module is only available when the `fastembed` feature is enabled.

use std::sync::Mutex;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{AskdocError, Result};

/// An [`EmbeddingProvider`] that runs a sentence-embedding model in-process.
///
/// Defaults to `all-MiniLM-L6-v2` (384 dimensions). Embedding is fully
/// deterministic for a fixed model version and needs no network access
/// after the model weights are cached locally.
///
/// Model load happens in the constructor; a load failure is fatal to the
/// phase that needs the provider, with no silent fallback.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc::local::LocalEmbeddingProvider;
///
/// let provider = LocalEmbeddingProvider::new()?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct LocalEmbeddingProvider {
    /// The model is not `Sync`, so calls are serialized through a mutex.
    model: Mutex<TextEmbedding>,
    dimensions: usize,
}

impl LocalEmbeddingProvider {
    /// Create a provider using the default `all-MiniLM-L6-v2` model.
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Create a provider with a specific fastembed model.
    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let mut text_model = TextEmbedding::try_new(InitOptions::new(model.clone()))
            .map_err(|e| AskdocError::Embedding {
                provider: "local".into(),
                message: format!("failed to load model: {e}"),
            })?;

        // Probe the model once to learn its output dimensionality.
        let probe = text_model.embed(vec!["probe"], None).map_err(|e| AskdocError::Embedding {
            provider: "local".into(),
            message: format!("model probe failed: {e}"),
        })?;
        let dimensions = probe
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| AskdocError::Embedding {
                provider: "local".into(),
                message: "model probe returned no embedding".into(),
            })?;

        info!(model = ?model, dimensions, "loaded local embedding model");

        Ok(Self { model: Mutex::new(text_model), dimensions })
    }

    fn run_model(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let mut model = self.model.lock().map_err(|_| AskdocError::Embedding {
            provider: "local".into(),
            message: "embedding model mutex poisoned".into(),
        })?;
        model.embed(texts, None).map_err(|e| AskdocError::Embedding {
            provider: "local".into(),
            message: format!("embedding failed: {e}"),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "local", text_len = text.len(), "embedding single text");

        let embeddings = self.run_model(vec![text])?;
        embeddings.into_iter().next().ok_or_else(|| AskdocError::Embedding {
            provider: "local".into(),
            message: "model returned no embedding".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "local", batch_size = texts.len(), "embedding batch");

        self.run_model(texts.to_vec())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
