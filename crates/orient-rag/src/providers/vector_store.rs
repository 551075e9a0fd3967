//! Vector store provider trait for similarity search over embedded documents

use async_trait::async_trait;
use crate::error::Result;

/// Search result from vector store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchResult {
    /// Document id inside the collection
    pub id: String,
    /// The matched document text
    pub document: String,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `LocalVectorStore`: SQLite file with brute-force cosine ranking
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace a document with its embedding
    async fn upsert_document(&self, id: &str, document: &str, embedding: &[f32]) -> Result<()>;

    /// Search for the most similar documents, best first
    async fn search(&self, query_embedding: &[f32], top_k: usize)
        -> Result<Vec<VectorSearchResult>>;

    /// Get total number of documents stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
