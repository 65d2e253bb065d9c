//! Grounded answer generation from retrieved context.
//!
//! [`AnswerGenerator`] assembles retrieved chunks into a bounded context
//! block, wraps it in a fixed instruction prompt, and invokes a
//! [`ChatModel`]. The instructions direct the model to ground every claim
//! in the supplied context, cite page numbers when present, and fall back
//! to a fixed not-found sentinel instead of fabricating an answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::document::{Answer, SearchResult};
use crate::error::Result;

/// The default not-found sentinel emitted when the context lacks an answer.
pub const DEFAULT_NOT_FOUND_SENTINEL: &str = "I cannot find this in the provided documents.";

/// An opaque language-model completion capability.
///
/// The pipeline depends only on `invoke(prompt) -> text`. Implementations
/// must surface network, auth, and rate-limit failures as typed
/// [`AskdocError::Generation`](crate::AskdocError::Generation) errors
/// rather than panicking, so a failed call never takes down a session.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the given prompt and return the generated text.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Builds grounded prompts and generates answers via a [`ChatModel`].
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    not_found_sentinel: String,
}

impl AnswerGenerator {
    /// Create a generator with the default not-found sentinel.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, not_found_sentinel: DEFAULT_NOT_FOUND_SENTINEL.to_string() }
    }

    /// Override the not-found sentinel the model is instructed to emit.
    pub fn with_not_found_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.not_found_sentinel = sentinel.into();
        self
    }

    /// The configured not-found sentinel.
    pub fn not_found_sentinel(&self) -> &str {
        &self.not_found_sentinel
    }

    /// Generate a grounded answer to `question` from the retrieved results.
    ///
    /// Chunks are assembled in retriever order (similarity-ranked, not
    /// document order), each annotated with its page number when present.
    /// The returned [`Answer`] carries the assembled context so the caller
    /// can display the evidence alongside the answer.
    ///
    /// # Errors
    ///
    /// Propagates the [`ChatModel`] failure unchanged; no pipeline state
    /// is affected by a failed generation call.
    pub async fn generate(&self, question: &str, results: &[SearchResult]) -> Result<Answer> {
        let context = assemble_context(results);
        let prompt = self.build_prompt(question, &context);

        let text = self.model.invoke(&prompt).await.inspect_err(|e| {
            error!(error = %e, "generation call failed");
        })?;

        info!(answer_len = text.len(), context_len = context.len(), "generated answer");

        Ok(Answer { text, context_used: context })
    }

    /// Build the final prompt from the instruction block, the context, and
    /// the raw user question.
    fn build_prompt(&self, question: &str, context: &str) -> String {
        format!(
            "You are an assistant answering questions about a set of uploaded documents.\n\
             Answer the question based strictly on the context provided below.\n\
             \n\
             Guidelines:\n\
             1. Quote the specific rule or value when the context states one.\n\
             2. Mention the page number if it is available in the context.\n\
             3. If the context does not contain the answer, reply exactly: \
             \"{sentinel}\"\n\
             Do not make up facts.\n\
             \n\
             <context>\n\
             {context}\n\
             </context>\n\
             \n\
             Question: {question}",
            sentinel = self.not_found_sentinel,
        )
    }
}

/// Concatenate chunk texts in retrieval order, annotating each with its
/// page number when the metadata carries one.
fn assemble_context(results: &[SearchResult]) -> String {
    let mut context = String::new();
    for result in results {
        if let Some(page) = result.chunk.page() {
            context.push_str(&format!("[Page {page}]\n"));
        }
        context.push_str(&result.chunk.text);
        context.push_str("\n\n");
    }
    context
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::{Chunk, META_PAGE};

    fn result(text: &str, page: Option<&str>, score: f32) -> SearchResult {
        let mut metadata = HashMap::new();
        if let Some(page) = page {
            metadata.insert(META_PAGE.to_string(), page.to_string());
        }
        SearchResult {
            chunk: Chunk {
                id: "doc_0".into(),
                text: text.into(),
                embedding: Vec::new(),
                metadata,
                document_id: "doc".into(),
            },
            score,
        }
    }

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn invoke(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn context_annotates_pages_and_preserves_order() {
        let results = vec![
            result("second-ranked text", Some("4"), 0.8),
            result("lower-ranked text", None, 0.5),
        ];
        let context = assemble_context(&results);
        assert!(context.starts_with("[Page 4]\nsecond-ranked text"));
        let first = context.find("second-ranked").unwrap();
        let second = context.find("lower-ranked").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn prompt_contains_context_question_and_sentinel_instruction() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel));
        let results = vec![result("Attendance must be at least 75%.", Some("12"), 0.9)];

        let answer = generator.generate("What is the attendance requirement?", &results)
            .await
            .unwrap();

        // EchoModel returns the full prompt, so we can inspect its assembly.
        assert!(answer.text.contains("75%"));
        assert!(answer.text.contains("[Page 12]"));
        assert!(answer.text.contains("Question: What is the attendance requirement?"));
        assert!(answer.text.contains(DEFAULT_NOT_FOUND_SENTINEL));
        assert!(answer.context_used.contains("75%"));
    }

    #[tokio::test]
    async fn custom_sentinel_is_used_in_instructions() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel))
            .with_not_found_sentinel("No such rule on record.");
        let answer = generator.generate("anything", &[]).await.unwrap();
        assert!(answer.text.contains("No such rule on record."));
        assert!(!answer.text.contains(DEFAULT_NOT_FOUND_SENTINEL));
    }
}
