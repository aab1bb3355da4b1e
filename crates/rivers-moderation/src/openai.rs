//! OpenAI-compatible moderation client

use crate::backend::ModerationBackend;
use async_trait::async_trait;
use reqwest::Client;
use rivers_types::{
    truncate, Backend, BackendError, BackendErrorKind, ModerationCategory, ModerationVerdict,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_MODERATION_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, Option<bool>>,
}

/// Moderation backend speaking the `/moderations` API.
pub struct OpenAiModeration {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    model: Option<String>,
}

impl std::fmt::Debug for OpenAiModeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiModeration")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiModeration {
    pub fn new(http: Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            http,
            endpoint: resolve_moderations_endpoint(base_url),
            api_key,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModerationBackend for OpenAiModeration {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, BackendError> {
        let api_key = self.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(BackendError::new(
                Backend::Moderation,
                BackendErrorKind::InvalidConfig,
                "moderation api key is not configured",
            ));
        }

        let payload = ModerationRequest {
            input: text,
            model: self.model.as_deref(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                BackendError::request_failed(
                    Backend::Moderation,
                    e.is_timeout(),
                    format!("moderation request failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::new(
                Backend::Moderation,
                BackendErrorKind::Status,
                format!("moderation error {}: {}", status, truncate(&body, 320)),
            ));
        }

        let body: ModerationResponse = response.json().await.map_err(|e| {
            BackendError::new(
                Backend::Moderation,
                BackendErrorKind::Decode,
                format!("invalid moderation response: {}", e),
            )
        })?;

        let result = body.results.into_iter().next().ok_or_else(|| {
            BackendError::new(
                Backend::Moderation,
                BackendErrorKind::Decode,
                "moderation response did not include results",
            )
        })?;

        Ok(ModerationVerdict {
            flagged: result.flagged,
            categories: result
                .categories
                .iter()
                .filter(|(_, raised)| raised.unwrap_or(false))
                .filter_map(|(label, _)| ModerationCategory::from_label(label))
                .collect(),
        })
    }
}

fn resolve_moderations_endpoint(base_url: &str) -> String {
    if base_url.ends_with("/moderations") {
        base_url.to_string()
    } else {
        format!("{}/moderations", base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: &str) -> OpenAiModeration {
        OpenAiModeration::new(
            Client::new(),
            &format!("{}/v1", server.uri()),
            SecretString::from(key.to_string()),
        )
    }

    fn moderation_response(flagged: bool, categories: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "modr-123",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": flagged,
                "categories": categories,
                "category_scores": {}
            }]
        })
    }

    #[test]
    fn endpoint_resolution() {
        assert_eq!(
            resolve_moderations_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/moderations"
        );
        assert_eq!(
            resolve_moderations_endpoint("http://proxy/moderations"),
            "http://proxy/moderations"
        );
    }

    #[tokio::test]
    async fn flagged_categories_are_mapped_to_taxonomy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/moderations"))
            .and(header("Authorization", "Bearer sk-mod"))
            .and(body_json(json!({"input": "some text"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(moderation_response(
                true,
                json!({
                    "sexual": false,
                    "hate": true,
                    "violence": true,
                    "violence/graphic": true,
                    "self-harm": false,
                    "illicit": null
                }),
            )))
            .mount(&server)
            .await;

        let verdict = client(&server, "sk-mod").moderate("some text").await.unwrap();
        assert!(verdict.flagged);
        assert_eq!(
            verdict.categories.into_iter().collect::<Vec<_>>(),
            vec![ModerationCategory::Hate, ModerationCategory::Violence]
        );
    }

    #[tokio::test]
    async fn clean_text_is_unflagged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/moderations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(moderation_response(false, json!({"sexual": false}))),
            )
            .mount(&server)
            .await;

        let verdict = client(&server, "sk-mod").moderate("hello").await.unwrap();
        assert_eq!(verdict, ModerationVerdict::unflagged());
    }

    #[tokio::test]
    async fn auth_rejection_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/moderations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client(&server, "sk-wrong").moderate("hello").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Status);
        assert!(err.message.contains("401"));
    }

    #[tokio::test]
    async fn empty_results_are_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/moderations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let err = client(&server, "sk-mod").moderate("hello").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Decode);
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let server = MockServer::start().await;
        let err = client(&server, "").moderate("hello").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::InvalidConfig);
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
