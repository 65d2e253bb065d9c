//! Session context for an interactive question-answering exchange.
//!
//! A [`Session`] owns the conversation history for one user interaction
//! and a handle to the shared [`Pipeline`]. It exists so interactive
//! shells do not need their own global state: created at session start,
//! cleared on explicit reset, dropped at session end.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Answer;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A question from the user.
    User,
    /// An answer from the assistant.
    Assistant,
}

/// A single conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn.
    pub role: Role,
    /// The turn's text content.
    pub content: String,
}

/// An interactive session over a shared [`Pipeline`].
///
/// History is accumulated in memory only. A failed question leaves the
/// history exactly as it was: turns are recorded only after the pipeline
/// returns an answer.
pub struct Session {
    pipeline: Arc<Pipeline>,
    history: Vec<Turn>,
}

impl Session {
    /// Start a new session over the given pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline, history: Vec::new() }
    }

    /// The pipeline this session queries.
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// The conversation history so far, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Ask a question and record both turns on success.
    ///
    /// # Errors
    ///
    /// Propagates any pipeline error unchanged. On error no turn is
    /// recorded, so the history never contains a question without its
    /// answer.
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let answer = self.pipeline.answer(question).await?;

        self.history.push(Turn { role: Role::User, content: question.to_string() });
        self.history.push(Turn { role: Role::Assistant, content: answer.text.clone() });

        Ok(answer)
    }

    /// Clear the conversation history.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
