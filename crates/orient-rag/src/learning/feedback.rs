//! Feedback types for learning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Type of feedback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Answer was helpful
    Like,
    /// Answer was not helpful
    Dislike,
}

impl Sentiment {
    /// Value stored in the `feedback` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Like => "like",
            Sentiment::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Sentiment::Like),
            "dislike" => Ok(Sentiment::Dislike),
            other => Err(Error::InvalidInput(format!("unknown feedback value: {}", other))),
        }
    }
}

/// Feedback request from user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// The interaction ID to provide feedback for
    #[serde(rename = "qa_id")]
    pub interaction_id: Uuid,
    /// Question that was asked
    #[serde(rename = "query")]
    pub question: String,
    /// Answer that was shown
    pub response: String,
    /// Like or dislike
    #[serde(rename = "feedback")]
    pub sentiment: Sentiment,
}

/// One stored feedback row; `id` is the interaction id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: Uuid,
    pub query: String,
    pub response: String,
    pub feedback: Sentiment,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackEvent {
    /// Stamp a request with the current time
    pub fn from_request(request: FeedbackRequest) -> Self {
        Self {
            id: request.interaction_id,
            query: request.question,
            response: request.response,
            feedback: request.sentiment,
            timestamp: Utc::now(),
        }
    }
}

/// Like/dislike counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub likes: usize,
    pub dislikes: usize,
    pub total: usize,
}
