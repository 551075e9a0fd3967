//! Ollama HTTP client for chat completions and embeddings

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, GenerationError, Result};

/// Ollama API client
///
/// Single attempt per call; a failed request is reported, never retried.
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
    /// Per-request timeout
    timeout: Duration,
}

/// One chat turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
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

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with the configured timeout
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            timeout,
        })
    }

    /// Generation model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding for a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "Embedding failed: HTTP {}",
                response.status()
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        Ok(embed_response.embedding)
    }

    /// Send a system + user turn and return the assistant's message content
    pub async fn chat(
        &self,
        system_prompt: &str,
        question: &str,
    ) -> std::result::Result<String, GenerationError> {
        let url = &self.config.chat_url;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(question)],
            stream: false,
            options: self.config.temperature.map(|temperature| ChatOptions { temperature }),
        };

        tracing::info!("Generating answer with model: {}", self.config.model);
        tracing::debug!("System prompt is {} bytes", system_prompt.len());

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, url, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, url, self.timeout))?;

        Ok(chat_response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config_for(base: &str) -> LlmConfig {
        LlmConfig {
            chat_url: format!("{}/api/chat", base),
            base_url: base.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 1,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_chat_sends_single_turn_and_reads_message_content() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["stream"], false);
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["role"], "user");
                assert!(body.get("options").is_none());
                let echo = body["messages"][1]["content"].as_str().unwrap().to_string();
                Json(json!({
                    "model": "test-model",
                    "message": { "role": "assistant", "content": format!("echo: {}", echo) },
                    "done": true
                }))
            }),
        );
        let base = spawn(router).await;

        let client = OllamaClient::new(&config_for(&base)).unwrap();
        let answer = client.chat("system rules", "Which branches?").await.unwrap();
        assert_eq!(answer, "echo: Which branches?");
    }

    #[tokio::test]
    async fn test_chat_http_error_is_status_failure() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let base = spawn(router).await;

        let client = OllamaClient::new(&config_for(&base)).unwrap();
        let err = client.chat("s", "q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_malformed() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { Json(json!({ "response": "wrong endpoint shape" })) }),
        );
        let base = spawn(router).await;

        let client = OllamaClient::new(&config_for(&base)).unwrap();
        let err = client.chat("s", "q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_chat_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(&config_for(&format!("http://{}", addr))).unwrap();
        let err = client.chat("s", "q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_chat_timeout() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "message": { "role": "assistant", "content": "late" } }))
            }),
        );
        let base = spawn(router).await;

        let client = OllamaClient::new(&config_for(&base)).unwrap();
        let err = client.chat("s", "q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_embed() {
        let router = Router::new().route(
            "/api/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "nomic-embed-text");
                Json(json!({ "embedding": [0.5, 0.25, 0.0] }))
            }),
        );
        let base = spawn(router).await;

        let client = OllamaClient::new(&config_for(&base)).unwrap();
        assert_eq!(client.embed("hello").await.unwrap(), vec![0.5, 0.25, 0.0]);
    }
}
