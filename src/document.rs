//! Data types for documents, chunks, search results, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key for the 1-based page number of a paginated source.
pub const META_PAGE: &str = "page";
/// Metadata key for the index of a chunk within its parent document.
pub const META_CHUNK_INDEX: &str = "chunk_index";
/// Metadata key for the path or identifier of the original source.
pub const META_SOURCE: &str = "source";

/// A source document (one logical page or section) with text and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional path or URI of the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Create a document with empty metadata and no source.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new(), source: None }
    }

    /// Attach a metadata key-value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A segment of a [`Document`] with its vector embedding.
///
/// Chunk IDs are `{document_id}_{chunk_index}`; the ID doubles as the
/// identity key for replace-on-conflict upserts, so re-ingesting the same
/// document overwrites its chunks instead of appending duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until the
    /// pipeline attaches one.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus chunk-specific fields.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

impl Chunk {
    /// The page number of this chunk's source, if it came from a paginated
    /// document.
    pub fn page(&self) -> Option<&str> {
        self.metadata.get(META_PAGE).map(String::as_str)
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A generated answer together with the context it was grounded in.
///
/// `context_used` carries the assembled context block so a caller can
/// display the retrieved evidence alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The model's answer text.
    pub text: String,
    /// The context block that was supplied to the model.
    pub context_used: String,
}
