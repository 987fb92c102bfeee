//! Conversation and state controller
//!
//! Owns one session: the task list, the transcript, the pending input and the
//! processing flag. Every mutation goes through [`Controller::submit`], which
//! sends the whole state to the bridge and applies the answer wholesale.

use crate::api::client::Client;
use crate::models::{seed_todos, ChatTurn, Task, GREETING};

/// Everything a session owns
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub todos: Vec<Task>,
    pub transcript: Vec<ChatTurn>,
    pub input: String,
    pub processing: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            todos: seed_todos(),
            transcript: vec![ChatTurn::assistant(GREETING)],
            input: String::new(),
            processing: false,
        }
    }
}

/// What a submission did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input; nothing was sent
    Ignored,
    /// The list was replaced
    Updated,
    /// The model answered without changing the list
    Replied,
    /// The call failed; the list is untouched
    Failed(String),
}

pub struct Controller<C: Client> {
    client: C,
    state: SessionState,
}

impl<C: Client> Controller<C> {
    /// New session with the seeded list and greeting
    pub fn new(client: C) -> Self {
        Self::with_state(client, SessionState::default())
    }

    pub fn with_state(client: C, state: SessionState) -> Self {
        Self { client, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn todos(&self) -> &[Task] {
        &self.state.todos
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.state.transcript
    }

    pub fn is_processing(&self) -> bool {
        self.state.processing
    }

    /// Replaces the pending input
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.state.input = input.into();
    }

    /// Submits the pending input; it is cleared once the call has finished
    pub async fn submit_input(&mut self) -> SubmitOutcome {
        let input = self.state.input.clone();
        self.submit(&input).await
    }

    /// Sends one utterance to the bridge and applies the result
    ///
    /// `&mut self` keeps at most one command in flight per session.
    pub async fn submit(&mut self, utterance: &str) -> SubmitOutcome {
        if utterance.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.state.transcript.push(ChatTurn::user(utterance));
        self.state.processing = true;

        let result = self
            .client
            .resolve(&self.state.transcript, &self.state.todos)
            .await;

        let outcome = match result {
            Ok(response) => {
                let outcome = match response.updated_todos {
                    Some(todos) => {
                        self.state.todos = todos;
                        SubmitOutcome::Updated
                    }
                    None => SubmitOutcome::Replied,
                };
                self.state
                    .transcript
                    .push(ChatTurn::assistant(response.response));
                outcome
            }
            Err(e) => {
                tracing::warn!("command failed, list left untouched: {}", e);
                let message = e.to_string();
                self.state
                    .transcript
                    .push(ChatTurn::assistant(format!("Something went wrong: {}", message)));
                SubmitOutcome::Failed(message)
            }
        };

        self.state.input.clear();
        self.state.processing = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::CoreClient;
    use crate::bridge::{Bridge, BridgeConfig};
    use crate::models::Role;
    use crate::provider::{ProviderError, ScriptedProvider};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn controller(provider: ScriptedProvider) -> Controller<CoreClient> {
        let bridge = Bridge::new(Arc::new(provider), BridgeConfig::default());
        Controller::new(CoreClient::new(bridge))
    }

    #[test]
    fn test_new_session_is_seeded() {
        let state = SessionState::default();
        assert_eq!(state.todos, vec![Task::new(1, "Try saying 'Add go to the gym'")]);
        assert_eq!(state.transcript, vec![ChatTurn::assistant(GREETING)]);
        assert!(!state.processing);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut controller = controller(ScriptedProvider::default());
        let before = controller.state().clone();

        assert_eq!(controller.submit("   \n\t").await, SubmitOutcome::Ignored);
        assert_eq!(controller.submit("").await, SubmitOutcome::Ignored);
        assert_eq!(controller.state(), &before);
    }

    #[tokio::test]
    async fn test_update_replaces_the_whole_list() {
        let mut controller = controller(ScriptedProvider::tool_call(
            r#"{"newList":[{"id":1,"text":"Try saying 'Add go to the gym'","completed":false},{"id":5,"text":"go to the gym","completed":false}]}"#,
        ));

        controller.set_input("Add go to the gym");
        assert_eq!(controller.submit_input().await, SubmitOutcome::Updated);

        // Exactly the returned list, not old + new
        assert_eq!(
            controller.todos(),
            &[
                Task::new(1, "Try saying 'Add go to the gym'"),
                Task::new(5, "go to the gym"),
            ]
        );
        assert_eq!(
            controller.transcript(),
            &[
                ChatTurn::assistant(GREETING),
                ChatTurn::user("Add go to the gym"),
                ChatTurn::assistant("I've updated your list!"),
            ]
        );
        assert!(controller.state().input.is_empty());
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn test_reply_leaves_list_untouched() {
        let mut controller = controller(ScriptedProvider::text("Your first task is to try me out."));
        let before = controller.todos().to_vec();

        assert_eq!(controller.submit("what's my first task?").await, SubmitOutcome::Replied);
        assert_eq!(controller.todos(), before.as_slice());
        assert_eq!(
            controller.transcript().last(),
            Some(&ChatTurn::assistant("Your first task is to try me out."))
        );
    }

    #[tokio::test]
    async fn test_failure_isolated_and_reported() {
        let mut controller = controller(ScriptedProvider::failing(ProviderError::Network(
            "connection reset".to_string(),
        )));
        let before = controller.todos().to_vec();

        controller.set_input("add milk");
        let outcome = controller.submit_input().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed("network error: connection reset".to_string())
        );
        assert_eq!(controller.todos(), before.as_slice());

        let last = controller.transcript().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("Something went wrong"));
        assert!(controller.state().input.is_empty());
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn test_full_transcript_is_sent() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(crate::provider::Completion::Text(Some("first".to_string()))),
            Ok(crate::provider::Completion::Text(Some("second".to_string()))),
        ]));
        let bridge = Bridge::new(provider.clone(), BridgeConfig::default());
        let mut controller = Controller::new(CoreClient::new(bridge));

        controller.submit("hello").await;
        controller.submit("again").await;

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].messages,
            vec![
                ChatTurn::assistant(GREETING),
                ChatTurn::user("hello"),
                ChatTurn::assistant("first"),
                ChatTurn::user("again"),
            ]
        );
    }
}
