//! Command bridge
//!
//! Turns a transcript plus the current list into either a complete
//! replacement list or a plain reply, through exactly one model call with
//! exactly one permitted tool. The bridge holds no session state: every call
//! sees only the snapshot it is handed.

use std::sync::Arc;

use chrono::Utc;

use crate::intent::has_removal_intent;
use crate::models::{find_duplicate_id, ChatResponse, ChatTurn, Role, Task};
use crate::prompt::{
    build_instructions, parse_update_arguments, update_todo_list_tool, UPDATE_CONFIRMATION,
    UPDATE_TOOL_NAME,
};
use crate::provider::{Completion, CompletionRequest, LlmProvider, ProviderError};

/// How far the bridge trusts the list the model hands back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Reject lists that drop existing tasks unless the user asked for removal
    #[default]
    Strict,
    /// Accept whatever well-formed list the model returns
    Trust,
}

#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub guard: GuardPolicy,
}

/// Bridge failures
///
/// Everything except a provider failure is about the tool argument the model
/// produced; none of them ever results in a partially applied list.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid update_todo_list arguments: {0}")]
    InvalidArguments(String),

    #[error("model called unknown tool '{0}'")]
    UnexpectedTool(String),

    #[error("model dropped tasks {missing:?} without being asked to remove anything")]
    UnexplainedDeletion { missing: Vec<i64> },
}

#[derive(Clone)]
pub struct Bridge {
    provider: Arc<dyn LlmProvider>,
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: BridgeConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Resolves one command against `current`
    ///
    /// `updated_todos` is `Some` only when the model invoked `update_todo_list`;
    /// a plain-text answer is passed through untouched.
    pub async fn resolve(
        &self,
        transcript: &[ChatTurn],
        current: &[Task],
    ) -> Result<ChatResponse, BridgeError> {
        let id_seed = Utc::now().timestamp_millis();
        let request = CompletionRequest {
            instructions: build_instructions(current, id_seed),
            messages: transcript.to_vec(),
            tools: vec![update_todo_list_tool()],
        };

        tracing::info!(
            provider = self.provider.name(),
            turns = transcript.len(),
            tasks = current.len(),
            "resolving command"
        );

        let completion = self.provider.complete(request).await.map_err(|e| {
            tracing::error!("provider call failed: {}", e);
            BridgeError::from(e)
        })?;

        match completion {
            Completion::Text(content) => {
                tracing::info!("model replied without changing the list");
                Ok(ChatResponse {
                    response: content.unwrap_or_default(),
                    updated_todos: None,
                })
            }
            Completion::ToolCall { name, arguments } => {
                if name != UPDATE_TOOL_NAME {
                    tracing::warn!(tool = %name, "model called an undeclared tool");
                    return Err(BridgeError::UnexpectedTool(name));
                }

                let new_list = parse_update_arguments(&arguments).map_err(|e| {
                    tracing::warn!("rejecting malformed tool arguments: {}", e);
                    BridgeError::InvalidArguments(e.to_string())
                })?;
                self.check(transcript, current, &new_list)?;

                tracing::info!(before = current.len(), after = new_list.len(), "list replaced");
                Ok(ChatResponse {
                    response: UPDATE_CONFIRMATION.to_string(),
                    updated_todos: Some(new_list),
                })
            }
        }
    }

    fn check(
        &self,
        transcript: &[ChatTurn],
        current: &[Task],
        new_list: &[Task],
    ) -> Result<(), BridgeError> {
        if let Some(id) = find_duplicate_id(new_list) {
            tracing::warn!(id, "rejecting list with duplicate id");
            return Err(BridgeError::InvalidArguments(format!(
                "duplicate task id {}",
                id
            )));
        }

        if self.config.guard == GuardPolicy::Trust {
            return Ok(());
        }

        let missing = dropped_ids(current, new_list);
        if missing.is_empty() {
            return Ok(());
        }

        let asked_for_removal = transcript
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map_or(false, |turn| has_removal_intent(&turn.content));
        if asked_for_removal {
            Ok(())
        } else {
            tracing::warn!(?missing, "rejecting unexplained deletion");
            Err(BridgeError::UnexplainedDeletion { missing })
        }
    }
}

/// Ids present in `before` but absent from `after`, in list order
fn dropped_ids(before: &[Task], after: &[Task]) -> Vec<i64> {
    before
        .iter()
        .map(|t| t.id)
        .filter(|id| !after.iter().any(|t| t.id == *id))
        .collect()
}
