//! Core client implementation
//!
//! This module provides a client implementation that wraps the Bridge directly,
//! providing the same interface as HttpClientImpl but without HTTP overhead.

use super::{Client, ClientError};
use crate::bridge::Bridge;
use crate::models::{ChatResponse, ChatTurn, Task};

/// A client implementation that wraps a Bridge directly
#[derive(Clone)]
pub struct CoreClient {
    bridge: Bridge,
}

impl CoreClient {
    /// Create a new CoreClient with the given Bridge instance
    pub fn new(bridge: Bridge) -> Self {
        Self { bridge }
    }
}

#[async_trait::async_trait]
impl Client for CoreClient {
    async fn resolve(
        &self,
        messages: &[ChatTurn],
        current_todos: &[Task],
    ) -> Result<ChatResponse, ClientError> {
        self.bridge
            .resolve(messages, current_todos)
            .await
            .map_err(ClientError::from)
    }
}
