//! LLM provider abstraction
//!
//! The bridge talks to the model through [`LlmProvider`]: one system
//! instruction, the chat transcript, and the tools the model may call. A
//! provider answers with either free text or a single tool invocation.
//!
//! [`OpenAiProvider`] is the production backend. [`OfflineProvider`] is a
//! rule-based stand-in for local runs. [`ScriptedProvider`] is test support
//! only: it replays queued completions so unit and integration tests can drive
//! the bridge, and is never selected by the CLI.

mod offline;
mod openai;
mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::ChatTurn;

pub use offline::OfflineProvider;
pub use openai::{OpenAiConfig, OpenAiProvider, DEFAULT_MODEL, OPENAI_API_URL};
pub use scripted::ScriptedProvider;

/// A function the model may invoke instead of replying in text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object
    pub parameters: serde_json::Value,
}

/// Everything a provider needs for one completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub instructions: String,
    pub messages: Vec<ChatTurn>,
    pub tools: Vec<ToolDefinition>,
}

/// What the model decided to do
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Plain reply; providers may return no content at all
    Text(Option<String>),
    /// A tool invocation with its raw JSON-encoded argument
    ToolCall { name: String, arguments: String },
}

/// Provider failures, surfaced verbatim to the caller
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("missing credential for provider '{0}'")]
    MissingCredential(String),
}

/// A chat model that supports tool calling
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier used in logs and the health endpoint
    fn name(&self) -> &str;

    /// Model identifier sent to the provider
    fn model(&self) -> &str;

    /// Runs one completion. The model may choose not to call any tool.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}
