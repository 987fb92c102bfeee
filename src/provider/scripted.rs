//! Replays canned completions
//!
//! Test support. It is public so the integration tests under `tests/` can use
//! it; nothing outside tests constructs it.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, CompletionRequest, LlmProvider, ProviderError};

/// Provider that answers from a queue and records every request it sees
///
/// Once the queue is exhausted every call fails with a network error.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<Completion, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider whose next answer is a plain text reply
    pub fn text(reply: &str) -> Self {
        Self::new(vec![Ok(Completion::Text(Some(reply.to_string())))])
    }

    /// Provider whose next answer is an `update_todo_list` call with `arguments`
    pub fn tool_call(arguments: &str) -> Self {
        Self::new(vec![Ok(Completion::ToolCall {
            name: crate::prompt::UPDATE_TOOL_NAME.to_string(),
            arguments: arguments.to_string(),
        })])
    }

    /// Provider whose next answer is an error
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }

        let next = match self.replies.lock() {
            Ok(mut guard) => guard.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| Err(ProviderError::Network("script exhausted".to_string())))
    }
}
