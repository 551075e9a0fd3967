//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for answer feedback.

mod database;

pub use database::FeedbackDb;
