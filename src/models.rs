//! Core models for the todo agent
//!
//! This module contains the data types shared by the bridge, the controller and
//! the HTTP API: tasks, chat turns, and the wire shapes of the chat endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single entry of the task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Unique within one list, derived from the creation timestamp in milliseconds
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Creates a new, not yet completed task
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Same task with the completion flag set
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// The placeholder list every new session starts with
pub fn seed_todos() -> Vec<Task> {
    vec![Task::new(1, "Try saying 'Add go to the gym'")]
}

/// Returns the first id that appears more than once in the list, if any
pub fn find_duplicate_id(todos: &[Task]) -> Option<i64> {
    let mut seen = HashSet::with_capacity(todos.len());
    todos.iter().map(|t| t.id).find(|id| !seen.insert(*id))
}

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The greeting every new transcript starts with
pub const GREETING: &str = "I am your task agent. Tell me what to do!";

/// Request body of the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub current_todos: Vec<Task>,
}

/// Success body of the chat endpoint
///
/// `updated_todos` is only present when the model replaced the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_todos: Option<Vec<Task>>,
}

/// Failure body of the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_rejects_missing_and_mistyped_fields() {
        let missing = json!({ "id": 1, "text": "a" });
        assert!(serde_json::from_value::<Task>(missing).is_err());

        let stringly_id = json!({ "id": "1", "text": "a", "completed": false });
        assert!(serde_json::from_value::<Task>(stringly_id).is_err());

        let fractional_id = json!({ "id": 1.5, "text": "a", "completed": false });
        assert!(serde_json::from_value::<Task>(fractional_id).is_err());

        let extra = json!({ "id": 1, "text": "a", "completed": false, "due": "today" });
        assert!(serde_json::from_value::<Task>(extra).is_err());
    }

    #[test]
    fn test_find_duplicate_id() {
        let unique = vec![Task::new(1, "a"), Task::new(2, "b")];
        assert_eq!(find_duplicate_id(&unique), None);

        let dup = vec![Task::new(1, "a"), Task::new(2, "b"), Task::new(1, "c")];
        assert_eq!(find_duplicate_id(&dup), Some(1));

        assert_eq!(find_duplicate_id(&[]), None);
    }

    #[test]
    fn test_chat_wire_format() {
        let req: ChatRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "add milk" }],
            "currentTodos": [{ "id": 1, "text": "a", "completed": true }]
        }))
        .unwrap();
        assert_eq!(req.messages[0], ChatTurn::user("add milk"));
        assert_eq!(req.current_todos, vec![Task::new(1, "a").completed()]);

        // No list field at all when nothing changed
        let plain = ChatResponse {
            response: "hi".to_string(),
            updated_todos: None,
        };
        assert_eq!(serde_json::to_value(&plain).unwrap(), json!({ "response": "hi" }));

        let updated = ChatResponse {
            response: "done".to_string(),
            updated_todos: Some(vec![]),
        };
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({ "response": "done", "updatedTodos": [] })
        );
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let turn = json!({ "role": "system", "content": "x" });
        assert!(serde_json::from_value::<ChatTurn>(turn).is_err());
    }
}
