//! Chat-completion client.

use crate::core::config::CompletionConfig;
use crate::core::errors::{AuditError, AuditResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Longest error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// A system + user message pair to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// A language model that answers a prompt with free text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AuditResult<String>;
}

/// Thread-safe completion service handle.
pub type SharedCompletion = Arc<dyn CompletionService>;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// One request per call; failures are returned, never retried.
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    /// Creates a client after validating `config`.
    pub fn new(config: CompletionConfig) -> AuditResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuditError::completion("failed to build HTTP client", e))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> AuditResult<String> {
        let mut builder = self.client.post(self.endpoint()).json(&self.body(request));
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuditError::completion("failed to reach completion service", e))?;

        let status_error = response.error_for_status_ref().err();
        if let Some(e) = status_error {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(AuditError::completion(
                format!("completion service rejected the request: {body}"),
                e,
            ));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AuditError::completion("malformed completion response", e))?;
        first_content(reply)
    }
}

/// Extracts the trimmed text of the first choice.
fn first_content(reply: ChatResponse) -> AuditResult<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(AuditError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            CompletionConfig::new()
                .with_api_key(Some("sk-test".to_string()))
                .with_base_url("http://localhost:9999/v1/"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        assert!(OpenAiClient::new(CompletionConfig::new()).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let request = CompletionRequest {
            system: "be formal".to_string(),
            user: "audit this".to_string(),
        };

        let body = serde_json::to_value(client.body(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be formal");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "audit this");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_first_content_is_trimmed() {
        let reply: ChatResponse = serde_json::from_str(
            r###"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "  ## Invoice 1021\n- ok \n"}}]}"###,
        )
        .unwrap();
        assert_eq!(first_content(reply).unwrap(), "## Invoice 1021\n- ok");
    }

    #[test]
    fn test_missing_content_is_empty_completion() {
        let reply: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_content(reply), Err(AuditError::EmptyCompletion)));

        let reply: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(matches!(first_content(reply), Err(AuditError::EmptyCompletion)));
    }
}
