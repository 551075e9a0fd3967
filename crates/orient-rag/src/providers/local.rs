//! Local provider implementation over the SQLite vector store

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::retrieval::VectorStore;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Local vector store wrapping the SQLite index
pub struct LocalVectorStore {
    store: Arc<VectorStore>,
}

impl LocalVectorStore {
    /// Create from existing VectorStore
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self { store }
    }

    /// Create from config
    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        let store = Arc::new(VectorStore::new(&config.index_path, config.collection.clone())?);
        tracing::info!(
            "Vector index opened at {} (collection: {})",
            config.index_path.display(),
            store.collection()
        );
        Ok(Self { store })
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn upsert_document(&self, id: &str, document: &str, embedding: &[f32]) -> Result<()> {
        // VectorStore is sync, wrap in blocking task
        let store = self.store.clone();
        let id = id.to_string();
        let document = document.to_string();
        let embedding = embedding.to_vec();
        tokio::task::spawn_blocking(move || store.upsert(&id, &document, &embedding))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        let store = self.store.clone();
        let query = query_embedding.to_vec();
        tokio::task::spawn_blocking(move || store.search(&query, top_k))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn len(&self) -> Result<usize> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.len())
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn health_check(&self) -> Result<bool> {
        // Local store is healthy if it can be counted
        Ok(self.len().await.is_ok())
    }

    fn name(&self) -> &str {
        "local-sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_provider_round_trip() {
        let provider = LocalVectorStore::new(Arc::new(VectorStore::in_memory("Orientation").unwrap()));
        assert!(provider.is_empty().await.unwrap());

        provider.upsert_document("1", "Cloud", &[1.0, 0.0]).await.unwrap();
        provider.upsert_document("2", "Data", &[0.0, 1.0]).await.unwrap();

        let results = provider.search(&[0.1, 0.9], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document, "Data");
        assert!(provider.health_check().await.unwrap());
    }
}
