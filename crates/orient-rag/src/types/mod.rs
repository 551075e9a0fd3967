//! Core data types for the RAG system

pub mod query;

pub use query::{AskRequest, AskResponse};
