//! LLM provider trait for chat completions

use async_trait::async_trait;
use crate::error::{GenerationError, Result};

/// Trait for chat-completion backends
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (`/api/chat`)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one system + user turn and return the raw assistant text
    async fn chat(
        &self,
        system_prompt: &str,
        question: &str,
    ) -> std::result::Result<String, GenerationError>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
