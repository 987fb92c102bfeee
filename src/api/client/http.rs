//! HTTP client
//!
//! This module provides HTTP client functionality to interact with a running
//! todo agent server.

use std::sync::Arc;

use reqwest::{Client as ReqwestClient, Error as ReqwestError};
use serde::Serialize;

use super::Client;
use crate::bridge::BridgeError;
use crate::models::{ChatResponse, ChatTurn, ErrorResponse, Task};

/// API client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] ReqwestError),

    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// HTTP client for the todo agent server
#[derive(Debug, Clone)]
pub struct HttpClientImpl {
    http_client: Arc<ReqwestClient>,
    config: ClientConfig,
}

impl HttpClientImpl {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            http_client: Arc::new(ReqwestClient::new()),
            config,
        }
    }
}

impl Default for HttpClientImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Client for HttpClientImpl {
    async fn resolve(
        &self,
        messages: &[ChatTurn],
        current_todos: &[Task],
    ) -> Result<ChatResponse, ClientError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ResolveRequest<'a> {
            messages: &'a [ChatTurn],
            current_todos: &'a [Task],
        }

        let url = format!("{}/api/openai", self.config.base_url.trim_end_matches('/'));
        let request = ResolveRequest {
            messages,
            current_todos,
        };
        let response = self.http_client.post(&url).json(&request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<ChatResponse>().await?);
        }

        let body = response.text().await?;
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => Err(ClientError::Api(err.error)),
            Err(_) => Err(ClientError::Api(format!("HTTP {}: {}", status, body))),
        }
    }
}
