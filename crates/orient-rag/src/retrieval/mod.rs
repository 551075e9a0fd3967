//! Document retrieval for grounding answers
//!
//! `Retriever::retrieve` never fails: an unreachable embedder or index, or an
//! empty collection, yields an empty context and the model is left to answer
//! "I don't know".

pub mod search;

pub use search::{cosine_similarity, VectorStore};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};

/// Source of supporting documents for a question
#[async_trait]
pub trait Retriever: Send + Sync {
    /// At most `k` document texts, most relevant first
    async fn retrieve(&self, question: &str, k: usize) -> Vec<String>;
}

/// Embeds the question and ranks stored documents by cosine similarity
pub struct SemanticRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl SemanticRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Retrieval with errors reported instead of swallowed
    pub async fn try_retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question is empty".to_string()));
        }

        let query_embedding = self.embedder.embed(question).await?;
        let results = self.store.search(&query_embedding, k.max(1)).await?;

        tracing::debug!(
            "Retrieved {} documents via {} (best similarity {:?})",
            results.len(),
            self.store.name(),
            results.first().map(|r| r.similarity)
        );

        Ok(results.into_iter().map(|r| r.document).collect())
    }
}

#[async_trait]
impl Retriever for SemanticRetriever {
    async fn retrieve(&self, question: &str, k: usize) -> Vec<String> {
        match self.try_retrieve(question, k).await {
            Ok(documents) => {
                if documents.is_empty() {
                    tracing::warn!("Vector index returned no documents, answering without context");
                }
                documents
            }
            Err(e) => {
                tracing::warn!("Retrieval failed, answering without context: {}", e);
                Vec::new()
            }
        }
    }
}
