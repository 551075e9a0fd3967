//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub retrieval: RetrievalConfig,
    /// Prompt and assistant persona
    pub prompt: PromptConfig,
    /// Feedback persistence configuration
    pub feedback: FeedbackConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    ///
    /// Recognised keys: `OLLAMA_API_URL`, `OLLAMA_BASE_URL`, `OLLAMA_MODEL`,
    /// `ORIENT_RAG_FEEDBACK_DB`, `ORIENT_RAG_INDEX`. `OLLAMA_API_URL` also moves
    /// the base URL to the same host unless `OLLAMA_BASE_URL` is set.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OLLAMA_API_URL") {
            if let Some(base) = url.trim_end_matches('/').strip_suffix("/api/chat") {
                self.llm.base_url = base.to_string();
            }
            self.llm.chat_url = url;
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = lookup("ORIENT_RAG_FEEDBACK_DB") {
            self.feedback.db_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("ORIENT_RAG_INDEX") {
            self.retrieval.index_path = PathBuf::from(path);
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be at least 1".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model must not be empty".to_string()));
        }
        if self.llm.embed_model.trim().is_empty() {
            return Err(Error::Config("llm.embed_model must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: true,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completion endpoint
    pub chat_url: String,
    /// Ollama base URL (embeddings and health checks)
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Sampling temperature, left to the server default when unset
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat_url: "http://localhost:11434/api/chat".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-coder:7b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            temperature: None,
            timeout_secs: 120,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// SQLite file holding the embedded documents
    pub index_path: PathBuf,
    /// Collection to query inside the index
    pub collection: String,
    /// Number of documents handed to the model
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let index_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orient-rag")
            .join("index.db");

        Self {
            index_path,
            collection: "Orientation".to_string(),
            top_k: 3,
        }
    }
}

/// Prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Assistant persona and subject area, placed at the top of the system prompt
    pub domain_instructions: String,
    /// Reply sent when the question is empty
    pub empty_question_message: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            domain_instructions: "You are a helpful assistant. You answer questions about the INPT \
                (Institut National des Postes et Télécommunications) and its three branches: \
                Cloud, Data, and Cybersecurity."
                .to_string(),
            empty_question_message: "Please ask a question about INPT branches.".to_string(),
        }
    }
}

/// Feedback persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// SQLite database for like/dislike events
    pub db_path: PathBuf,
    /// Default destination of the exported analysis
    pub export_path: PathBuf,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("feedback.db"),
            export_path: PathBuf::from("feedback_analysis.json"),
        }
    }
}
