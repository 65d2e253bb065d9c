//! Retrieval-augmented question answering over local documents.
//!
//! `askdoc` implements the classic build-then-query pipeline: documents are
//! chunked, embedded, and stored in a vector index; at query time the most
//! relevant chunks are retrieved and passed, with a strict grounding
//! prompt, to a language model that answers from them or says it cannot.
//!
//! Components are trait seams, so backends compose freely:
//!
//! - [`Chunker`] — [`RecursiveChunker`] (paragraph → sentence → character)
//!   or [`CharacterChunker`]
//! - [`EmbeddingProvider`] — local `fastembed` model (`fastembed` feature)
//!   or an OpenAI-compatible API (`openai` feature)
//! - [`VectorStore`] — [`InMemoryVectorStore`] or the directory-backed
//!   [`PersistentVectorStore`]
//! - [`ChatModel`] — Groq chat completions (`groq` feature), or anything
//!   that can complete a prompt
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc::{
//!     AnswerGenerator, InMemoryVectorStore, Pipeline, PipelineConfig, Session,
//! };
//!
//! let pipeline = Arc::new(
//!     Pipeline::builder()
//!         .config(PipelineConfig::default())
//!         .embedder(Arc::new(embedder))
//!         .store(Arc::new(InMemoryVectorStore::new()))
//!         .generator(AnswerGenerator::new(Arc::new(chat_model)))
//!         .build()?,
//! );
//!
//! pipeline.ingest_path("rules.pdf").await?;
//!
//! let mut session = Session::new(pipeline);
//! let answer = session.ask("What is the attendance requirement?").await?;
//! println!("{}", answer.text);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod loader;
pub mod memory;
pub mod persistent;
pub mod pipeline;
pub mod retriever;
pub mod session;
pub mod vectorstore;

#[cfg(feature = "groq")]
pub mod groq;
#[cfg(feature = "fastembed")]
pub mod local;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{CharacterChunker, Chunker, RecursiveChunker};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Answer, Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{AskdocError, Result};
pub use generation::{AnswerGenerator, ChatModel, DEFAULT_NOT_FOUND_SENTINEL};
pub use loader::load_path;
pub use memory::InMemoryVectorStore;
pub use persistent::PersistentVectorStore;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use retriever::Retriever;
pub use session::{Role, Session, Turn};
pub use vectorstore::VectorStore;

#[cfg(feature = "groq")]
pub use groq::GroqChatModel;
#[cfg(feature = "fastembed")]
pub use local::LocalEmbeddingProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddingProvider;
