//! OpenAI Chat Completions provider

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Completion, CompletionRequest, LlmProvider, ProviderError, ToolDefinition};
use crate::models::{ChatTurn, Role};

/// Default Chat Completions endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI provider configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    /// Upper bound for one provider round trip
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: OPENAI_API_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Calls the Chat Completions API with `tool_choice: "auto"`
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(json!({
            "role": "system",
            "content": request.instructions,
        }));
        messages.extend(request.messages.iter().map(message_to_openai));

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            let tools: Vec<serde_json::Value> = request.tools.iter().map(tool_to_openai).collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

fn message_to_openai(turn: &ChatTurn) -> serde_json::Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    json!({ "role": role, "content": turn.content })
}

fn tool_to_openai(tool: &ToolDefinition) -> serde_json::Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

/// Maps a non-success HTTP status to a provider error
fn parse_http_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Authentication(body.to_string()),
        429 => ProviderError::RateLimited(body.to_string()),
        _ => ProviderError::Http {
            status,
            body: body.to_string(),
        },
    }
}

/// Picks the first tool call of the first choice, else its text
fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: OpenAiResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("failed to parse response: {}", e)))?;

    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| ProviderError::MalformedResponse("response has no message".to_string()))?;

    match message.tool_calls.and_then(|calls| calls.into_iter().next()) {
        Some(call) => Ok(Completion::ToolCall {
            name: call.function.name,
            arguments: call.function.arguments,
        }),
        None => Ok(Completion::Text(message.content)),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential(self.name().to_string()))?;

        let body = self.build_request_body(&request);
        tracing::debug!(model = %self.config.model, messages = request.messages.len(), "calling openai");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Network(format!("request timed out: {}", e))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_http_error(status.as_u16(), &body_text));
        }

        parse_response(&body_text)
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::update_todo_list_tool;

    fn test_provider() -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_puts_instructions_first() {
        let provider = test_provider();
        let request = CompletionRequest {
            instructions: "be helpful".to_string(),
            messages: vec![ChatTurn::assistant("hello"), ChatTurn::user("add milk")],
            tools: vec![update_todo_list_tool()],
        };

        let body = provider.build_request_body(&request);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be helpful");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][2]["role"], "user");
        assert_eq!(body["messages"][2]["content"], "add milk");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"].as_array().unwrap().len(), 1);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "update_todo_list");
    }

    #[test]
    fn test_parse_text_response() {
        let body = r#"{"choices":[{"message":{"content":"Your third task is X","tool_calls":null},"finish_reason":"stop"}]}"#;
        assert_eq!(
            parse_response(body).unwrap(),
            Completion::Text(Some("Your third task is X".to_string()))
        );
    }

    #[test]
    fn test_parse_tool_call_response() {
        let body = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"call_1","type":"function","function":{"name":"update_todo_list","arguments":"{\"newList\":[]}"}}
        ]}}]}"#;
        assert_eq!(
            parse_response(body).unwrap(),
            Completion::ToolCall {
                name: "update_todo_list".to_string(),
                arguments: r#"{"newList":[]}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(matches!(
            parse_response("not json"),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(r#"{"choices":[]}"#),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_http_error_mapping() {
        assert!(matches!(
            parse_http_error(401, "bad key"),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            parse_http_error(429, "slow down"),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            parse_http_error(503, "down"),
            ProviderError::Http { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let provider = OpenAiProvider::new(OpenAiConfig::default()).unwrap();
        let request = CompletionRequest {
            instructions: String::new(),
            messages: vec![],
            tools: vec![],
        };
        assert!(matches!(
            provider.complete(request).await,
            Err(ProviderError::MissingCredential(_))
        ));
    }
}
