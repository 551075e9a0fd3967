//! Provider abstractions for embeddings, LLM chat and vector storage
//!
//! The pipeline only talks to these traits, so backends (and test doubles)
//! can be swapped without touching the query flow.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};
