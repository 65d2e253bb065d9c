//! Error types for the `askdoc` crate.

use thiserror::Error;

/// Errors that can occur while building or querying a document index.
///
/// Every variant is recoverable at the request level: none of them leaves
/// the persisted index or a session's history in a partial state.
#[derive(Debug, Error)]
pub enum AskdocError {
    /// A source document is missing, unreadable, or yields no extractable text.
    #[error("Input error: {0}")]
    Input(String),

    /// Invalid or missing configuration (credentials, model identifiers,
    /// chunking parameters).
    #[error("Configuration error: {0}")]
    Config(String),

    /// No persisted index exists at the given location. The caller should
    /// build one before querying.
    #[error("No index found at '{path}'; ingest a document to build one")]
    IndexNotFound {
        /// The store location that was probed.
        path: String,
    },

    /// The index exists but holds no chunks yet; queries are blocked until
    /// a document has been ingested.
    #[error("Index is not ready; ingest a document before querying")]
    IndexNotReady,

    /// An error from an embedding backend (model load, network, auth).
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from a vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    Store {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from a generation backend (network, auth, rate limit).
    #[error("Generation error ({backend}): {message}")]
    Generation {
        /// The generation backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for askdoc operations.
pub type Result<T> = std::result::Result<T, AskdocError>;
