//! orient-rag: question answering over an orientation knowledge base
//!
//! Questions are embedded and matched against a local vector index, the best
//! passages are handed to a local Ollama model with a strict "answer only from
//! this data" prompt, and the model's final answer is returned with an
//! interaction id. Users rate answers with like/dislike; the ratings are stored
//! in SQLite and summarized by the feedback analyzer.

pub mod config;
pub mod error;
pub mod generation;
pub mod learning;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, GenerationError, Result};
pub use learning::{FeedbackAnalyzer, FeedbackReport, FeedbackRequest, FeedbackStats, Sentiment};
pub use pipeline::RagPipeline;
pub use types::{AskRequest, AskResponse};
