//! Query request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question submitted to the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    #[serde(default)]
    pub query: String,
}

/// Answer returned to the caller
///
/// `interaction_id` is absent only when the question was empty; feedback for
/// the answer is submitted against this id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(rename = "response")]
    pub answer: String,
    #[serde(rename = "qa_id", default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<Uuid>,
}

impl AskResponse {
    /// Answer to a real question
    pub fn answered(answer: String) -> Self {
        Self {
            answer,
            interaction_id: Some(Uuid::new_v4()),
        }
    }

    /// Reply to an empty question
    pub fn prompt_for_input(message: &str) -> Self {
        Self {
            answer: message.to_string(),
            interaction_id: None,
        }
    }
}
