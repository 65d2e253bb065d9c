//! Groq chat-completion backend.
//!
//! This module is only available when the `groq` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{AskdocError, Result};
use crate::generation::ChatModel;

/// The Groq OpenAI-compatible chat completions endpoint.
const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The default Groq model.
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Low default temperature biases toward extractive, literal answers.
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A [`ChatModel`] backed by Groq's OpenAI-compatible chat API.
///
/// # Configuration
///
/// - `model` — defaults to `llama-3.3-70b-versatile`.
/// - `temperature` — defaults to 0.1 for near-deterministic decoding.
/// - `api_key` — from the constructor or the `GROQ_API_KEY` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc::groq::GroqChatModel;
///
/// let model = GroqChatModel::new("gsk_...")?;
/// let reply = model.invoke("Say hello").await?;
/// ```
pub struct GroqChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqChatModel {
    /// Create a new model client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AskdocError::Config("Groq API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a new model client using the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| AskdocError::Config("GROQ_API_KEY environment variable not set".into()))?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── ChatModel implementation ───────────────────────────────────────

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        debug!(backend = "groq", model = %self.model, prompt_len = prompt.len(), "invoking");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "groq", error = %e, "request failed");
                AskdocError::Generation {
                    backend: "groq".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(backend = "groq", %status, "API error");
            return Err(AskdocError::Generation {
                backend: "groq".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(backend = "groq", error = %e, "failed to parse response");
            AskdocError::Generation {
                backend: "groq".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AskdocError::Generation {
                backend: "groq".into(),
                message: "API returned no choices".into(),
            })
    }
}
