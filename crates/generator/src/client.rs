//! OpenAI-compatible chat completion client

use std::time::Duration;

use async_trait::async_trait;
use memecoin_core::config::CompletionConfig;
use memecoin_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One role-tagged chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<ChatMessage>,
}

/// A service that turns a chat prompt into free-form text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the text of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Completion client speaking the OpenAI chat API over HTTP
pub struct HttpCompletionClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpCompletionClient {
    /// Create a client for the configured base URL
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::completion(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(model = %request.model, max_tokens = request.max_tokens, "Sending completion request");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::completion(format!("Request to {} failed: {}", self.endpoint, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::completion(format!("HTTP {}: {}", status, body)));
        }

        let body: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| Error::completion(format!("Invalid response format from API: {}", e)))?;

        content_of(body)
    }
}

fn content_of(body: CompletionResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .map(|message| message.content)
        .ok_or_else(|| Error::completion("Invalid response format from API: no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> CompletionConfig {
        CompletionConfig {
            url: url.to_string(),
            model: "llama".to_string(),
            api_key: "GAIANET".to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpCompletionClient::new(&config("https://node.gaia.domains/v1/")).unwrap();
        assert_eq!(client.endpoint(), "https://node.gaia.domains/v1/chat/completions");
    }

    #[test]
    fn test_request_serializes_as_chat_api_body() {
        let request = CompletionRequest {
            model: "llama".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: 0.8,
            max_tokens: 150,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "llama");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 150);
    }

    #[test]
    fn test_envelope_without_choices_is_malformed() {
        let body: CompletionResponse = serde_json::from_str(r#"{"object":"error"}"#).unwrap();
        assert!(matches!(content_of(body), Err(Error::Completion(_))));

        let body: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"pong"}}]}"#,
        )
        .unwrap();
        assert_eq!(content_of(body).unwrap(), "pong");
    }
}
