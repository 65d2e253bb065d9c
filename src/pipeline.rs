//! Pipeline orchestrator: ingest documents, retrieve chunks, answer questions.
//!
//! The [`Pipeline`] composes a [`Chunker`], an [`EmbeddingProvider`], a
//! [`VectorStore`], and an optional [`AnswerGenerator`] into the two
//! workflows of the system:
//!
//! - build phase: load → chunk → embed → store (one-shot per document)
//! - query phase: embed → search → generate (repeated per question)
//!
//! The store is only mutated after an entire batch of documents has been
//! chunked and embedded successfully, so no error path leaves a partially
//! built index behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc::{Pipeline, PipelineConfig, InMemoryVectorStore, RecursiveChunker};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.ingest(&documents).await?;
//! let results = pipeline.retrieve("attendance requirement", None).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::PipelineConfig;
use crate::document::{Answer, Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{AskdocError, Result};
use crate::generation::AnswerGenerator;
use crate::loader;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The document question-answering pipeline.
///
/// Construct one via [`Pipeline::builder()`]. The generator is optional:
/// without one, the pipeline still supports ingest and retrieval, and
/// [`answer`](Pipeline::answer) reports a configuration error.
pub struct Pipeline {
    config: PipelineConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retriever: Retriever,
    generator: Option<AnswerGenerator>,
}

impl Pipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Whether the index is ready to serve queries.
    ///
    /// Ready means at least one chunk is stored — either from an ingest in
    /// this process or from a persisted index opened at startup. Callers
    /// should block query submission until this returns `true`.
    pub async fn is_ready(&self) -> Result<bool> {
        Ok(self.store.count().await? > 0)
    }

    /// Ingest documents: chunk → embed → store.
    ///
    /// The store is written once, after every chunk of every document has
    /// been embedded; a failure anywhere leaves the index untouched.
    /// Returns the stored chunks with embeddings attached.
    ///
    /// # Errors
    ///
    /// - [`AskdocError::Input`] if the documents yield no non-whitespace
    ///   chunks at all (e.g. a scanned, image-only PDF).
    /// - [`AskdocError::Pipeline`] if embedding or storage fails.
    pub async fn ingest(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks: Vec<Chunk> = Vec::new();
        for document in documents {
            chunks.extend(self.chunker.chunk(document));
        }

        if chunks.is_empty() {
            return Err(AskdocError::Input(
                "no extractable text in the supplied documents; \
                 the source may be a scanned or image-only file"
                    .into(),
            ));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingest");
            AskdocError::Pipeline(format!("embedding failed during ingest: {e}"))
        })?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.add(&chunks).await.map_err(|e| {
            error!(error = %e, "store write failed during ingest");
            AskdocError::Pipeline(format!("store write failed during ingest: {e}"))
        })?;

        info!(document_count = documents.len(), chunk_count = chunks.len(), "ingested documents");

        Ok(chunks)
    }

    /// Load a file from disk and ingest it.
    ///
    /// Text files become a single document; PDFs become one document per
    /// page (with the `pdf` feature).
    pub async fn ingest_path(&self, path: impl AsRef<std::path::Path>) -> Result<Vec<Chunk>> {
        let documents = loader::load_path(path)?;
        self.ingest(&documents).await
    }

    /// Retrieve chunks relevant to `query`, ranked by descending similarity.
    ///
    /// `k` overrides the configured `top_k` when given. Results below the
    /// configured similarity threshold are filtered out.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocError::IndexNotReady`] if nothing has been ingested
    /// yet, and [`AskdocError::Pipeline`] on embedding or search failure.
    pub async fn retrieve(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchResult>> {
        if !self.is_ready().await? {
            return Err(AskdocError::IndexNotReady);
        }

        let k = k.unwrap_or(self.config.top_k);
        let results = self.retriever.retrieve(query, k).await?;

        let threshold = self.config.similarity_threshold;
        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), "query completed");
        Ok(filtered)
    }

    /// Answer a question: retrieve the top chunks, then generate a grounded
    /// answer from them.
    ///
    /// # Errors
    ///
    /// - [`AskdocError::IndexNotReady`] if nothing has been ingested yet.
    /// - [`AskdocError::Config`] if no chat model was configured.
    /// - [`AskdocError::Generation`] if the model call fails; the index and
    ///   any session history are unaffected.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            AskdocError::Config("no chat model configured; answering is unavailable".into())
        })?;

        let results = self.retrieve(question, None).await?;
        generator.generate(question, &results).await
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// `embedder` and `store` are required. The chunker defaults to a
/// [`RecursiveChunker`] sized from the config; the generator is optional.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Option<AnswerGenerator>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration. Defaults to
    /// [`PipelineConfig::default()`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker. Defaults to a [`RecursiveChunker`] using
    /// the configured chunk size and overlap.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the answer generator (optional; without it the pipeline is
    /// retrieval-only).
    pub fn generator(mut self, generator: AnswerGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`Pipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocError::Config`] if `embedder` or `store` is missing.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| AskdocError::Config("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| AskdocError::Config("store is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store));

        Ok(Pipeline { config, chunker, embedder, store, retriever, generator: self.generator })
    }
}
