//! Client trait definition
//!
//! This module defines the `Client` trait that abstracts over different client implementations.

use super::ClientError;
use crate::models::{ChatResponse, ChatTurn, Task};

/// Trait defining how a session reaches the command bridge
#[async_trait::async_trait]
pub trait Client: Send + Sync {
    /// Sends the full transcript and current list, returns the bridge's answer
    async fn resolve(
        &self,
        messages: &[ChatTurn],
        current_todos: &[Task],
    ) -> Result<ChatResponse, ClientError>;
}
