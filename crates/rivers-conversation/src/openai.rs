//! OpenAI-compatible chat completion client

use crate::backend::{CompletionBackend, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use rivers_types::{truncate, Backend, BackendError, BackendErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.x.ai/v1";

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Completion backend speaking the `/chat/completions` API.
pub struct OpenAiCompatibleCompletion {
    http: Client,
    endpoint: String,
    api_key: SecretString,
}

impl std::fmt::Debug for OpenAiCompatibleCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleCompletion")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleCompletion {
    pub fn new(http: Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            http,
            endpoint: resolve_chat_endpoint(base_url),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, BackendError> {
        let api_key = self.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(BackendError::new(
                Backend::Completion,
                BackendErrorKind::InvalidConfig,
                "completion api key is not configured",
            ));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                BackendError::request_failed(
                    Backend::Completion,
                    e.is_timeout(),
                    format!("completion request failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::new(
                Backend::Completion,
                BackendErrorKind::Status,
                format!("completion error {}: {}", status, truncate(&body, 320)),
            ));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            BackendError::new(
                Backend::Completion,
                BackendErrorKind::Decode,
                format!("invalid completion response: {}", e),
            )
        })?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| extract_text(&message.content))
            .filter(|text| !text.is_empty()))
    }
}

fn resolve_chat_endpoint(base_url: &str) -> String {
    if base_url.contains("/chat/completions") {
        base_url.to_string()
    } else {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CompletionMessage;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "grok-beta".to_string(),
            messages: vec![
                CompletionMessage::system("be nice"),
                CompletionMessage::from(&rivers_types::ConversationTurn::user("hi")),
            ],
            temperature: 0.9,
            max_tokens: 500,
        }
    }

    fn client(server: &MockServer, http: Client) -> OpenAiCompatibleCompletion {
        OpenAiCompatibleCompletion::new(
            http,
            &format!("{}/v1", server.uri()),
            SecretString::from("xai-key".to_string()),
        )
    }

    #[test]
    fn text_extraction_handles_string_and_parts() {
        assert_eq!(extract_text(&json!("hello")), "hello");
        assert_eq!(
            extract_text(&json!([{"type": "text", "text": "a"}, {"type": "image"}, {"text": "b"}])),
            "a\nb"
        );
        assert_eq!(extract_text(&Value::Null), "");
    }

    #[tokio::test]
    async fn request_carries_context_and_sampling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer xai-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hey babe! 😘"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, Client::new()).complete(&request()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Hey babe! 😘"));

        let received = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "grok-beta");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "hi"}));
        assert_eq!(body["temperature"], 0.9);
    }

    #[tokio::test]
    async fn missing_choices_or_content_is_no_text() {
        for payload in [
            json!({"choices": []}),
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
            json!({"choices": [{"message": {"role": "assistant", "content": ""}}]}),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .respond_with(ResponseTemplate::new(200).set_body_json(payload))
                .mount(&server)
                .await;

            let reply = client(&server, Client::new()).complete(&request()).await.unwrap();
            assert_eq!(reply, None);
        }
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server, Client::new()).complete(&request()).await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Status);
        assert_eq!(err.backend, Backend::Completion);
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let http = Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client(&server, http).complete(&request()).await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Timeout);
    }
}
