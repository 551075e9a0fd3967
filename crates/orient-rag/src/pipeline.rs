//! Question answering pipeline and feedback operations
//!
//! `ask` always produces text: empty questions get a prompt-for-input reply,
//! retrieval problems shrink the context, and generation failures become a
//! fixed apology. Feedback writes are the only operations that can fail.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{PromptConfig, RagConfig};
use crate::error::{Error, Result};
use crate::generation::{extract_final_answer, PromptBuilder, FALLBACK_ANSWER};
use crate::learning::{
    FeedbackAnalyzer, FeedbackEvent, FeedbackReport, FeedbackRequest, FeedbackStats,
};
use crate::providers::{
    local::LocalVectorStore, ollama::OllamaProvider, EmbeddingProvider, LlmProvider,
    VectorStoreProvider,
};
use crate::retrieval::{Retriever, SemanticRetriever};
use crate::storage::FeedbackDb;
use crate::types::AskResponse;

/// Retrieval-augmented question answering with feedback capture
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    feedback: Arc<FeedbackDb>,
    prompt: PromptConfig,
    top_k: usize,
}

impl RagPipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmProvider>,
        feedback: Arc<FeedbackDb>,
        config: &RagConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            feedback,
            prompt: config.prompt.clone(),
            top_k: config.retrieval.top_k.max(1),
        }
    }

    /// Build the local stack: Ollama for embeddings and chat, SQLite for the index and feedback
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        config.validate()?;

        let (embedder, llm) = OllamaProvider::new(&config.llm)?.split();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let store: Arc<dyn VectorStoreProvider> =
            Arc::new(LocalVectorStore::from_config(&config.retrieval)?);
        let retriever = Arc::new(SemanticRetriever::new(embedder, store));
        let feedback = Arc::new(FeedbackDb::new(&config.feedback.db_path)?);

        tracing::info!(
            "Pipeline ready (model: {}, collection: {}, top_k: {})",
            config.llm.model,
            config.retrieval.collection,
            config.retrieval.top_k
        );

        Ok(Self::new(retriever, Arc::new(llm), feedback, config))
    }

    /// The chat backend in use
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Answer a question from retrieved context
    pub async fn ask(&self, question: &str) -> AskResponse {
        if question.trim().is_empty() {
            return AskResponse::prompt_for_input(&self.prompt.empty_question_message);
        }

        let start = Instant::now();
        tracing::info!("Query: \"{}\"", question);

        let documents = self.retriever.retrieve(question, self.top_k).await;
        let system_prompt =
            PromptBuilder::build_system_prompt(&documents, &self.prompt.domain_instructions);

        let answer = match self.llm.chat(&system_prompt, question).await {
            Ok(raw) => extract_final_answer(&raw),
            Err(e) => {
                tracing::error!("Error querying {} ({}): {}", self.llm.name(), self.llm.model(), e);
                FALLBACK_ANSWER.to_string()
            }
        };

        let response = AskResponse::answered(answer);
        tracing::info!(
            "Query completed in {}ms with {} context documents",
            start.elapsed().as_millis(),
            documents.len()
        );
        response
    }

    /// Store like/dislike feedback for an answer
    ///
    /// The id is not checked against issued interactions; a repeated id
    /// replaces the earlier feedback.
    pub async fn submit_feedback(&self, request: FeedbackRequest) -> Result<()> {
        let event = FeedbackEvent::from_request(request);
        tracing::info!("Feedback {} for interaction {}", event.feedback, event.id);

        let db = Arc::clone(&self.feedback);
        tokio::task::spawn_blocking(move || db.record_feedback(&event))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    /// Like/dislike totals
    pub async fn feedback_stats(&self) -> Result<FeedbackStats> {
        let db = Arc::clone(&self.feedback);
        tokio::task::spawn_blocking(move || db.feedback_stats())
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    /// Full report over all stored feedback
    pub async fn analyze_feedback(&self) -> Result<FeedbackReport> {
        let db = Arc::clone(&self.feedback);
        tokio::task::spawn_blocking(move || FeedbackAnalyzer::analyze_store(&db))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }
}
