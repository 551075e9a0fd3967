//! Learning loop: feedback capture types and feedback analysis

pub mod analyzer;
pub mod feedback;

pub use analyzer::{FeedbackAnalyzer, FeedbackReport, ReportStats};
pub use feedback::{FeedbackEvent, FeedbackRequest, FeedbackStats, Sentiment};
