//! OpenAI-compatible chat completions client.
//!
//! Implements [`CompletionApi`] against the provider's chat completions
//! endpoint, classifying non-success statuses into [`TransportError`] so the
//! extraction engine can apply its retry policy.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::extraction::{CompletionApi, TransportError};
use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Chat completions client for an OpenAI-compatible provider.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key, base URL, and model.
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(&format!(
            "Bearer {api_key}"
        ))
        .map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Invalid API key format".to_string(),
                )),
            }
        })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, TransportError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Completion request failed: {:?}", e);
                TransportError::Network(Box::new(e))
            })?;

        let status = response.status();

        if status.is_success() {
            let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
                warn!("Failed to decode completion envelope: {:?}", e);
                TransportError::Network(Box::new(e))
            })?;

            completion
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or(TransportError::Api {
                    status: status.as_u16(),
                })
        } else {
            Err(classify_status(status.as_u16(), retry_after(&response)))
        }
    }
}

/// Reads a delta-seconds `Retry-After` hint. HTTP-date values are ignored.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn classify_status(status: u16, retry_after: Option<Duration>) -> TransportError {
    match status {
        429 => TransportError::RateLimited { retry_after },
        401 => TransportError::InvalidCredentials,
        403 => TransportError::Forbidden,
        500..=599 => TransportError::Server { status },
        _ => TransportError::Api { status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn returns_the_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope(r#"[{"task":"Follow up"}]"#))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini").unwrap();
        let raw = client.complete("prompt").await.unwrap();

        assert_eq!(raw, r#"[{"task":"Follow up"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_hint() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "2")
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini").unwrap();
        let err = client.complete("prompt").await.unwrap_err();

        match err {
            TransportError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(2)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_classified_as_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini").unwrap();
        let err = client.complete("prompt").await.unwrap_err();

        assert!(matches!(err, TransportError::InvalidCredentials));
    }

    #[tokio::test]
    async fn server_errors_carry_their_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(502)
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini").unwrap();
        let err = client.complete("prompt").await.unwrap_err();

        assert!(matches!(err, TransportError::Server { status: 502 }));
    }

    #[test]
    fn other_client_statuses_are_api_errors() {
        assert!(matches!(
            classify_status(418, None),
            TransportError::Api { status: 418 }
        ));
    }
}
