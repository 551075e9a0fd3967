//! Feedback capture and reporting endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::learning::{FeedbackReport, FeedbackRequest, FeedbackStats};
use crate::server::state::AppState;

/// Acknowledgement for stored feedback
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub status: String,
}

/// POST /feedback - Record like/dislike for an answer
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackAck>> {
    state.pipeline().submit_feedback(request).await?;
    Ok(Json(FeedbackAck {
        status: "success".to_string(),
    }))
}

/// GET /feedback/stats - Like/dislike totals
pub async fn feedback_stats(State(state): State<AppState>) -> Result<Json<FeedbackStats>> {
    Ok(Json(state.pipeline().feedback_stats().await?))
}

/// GET /feedback/analysis - Insights and recommendations over all feedback
pub async fn feedback_analysis(State(state): State<AppState>) -> Result<Json<FeedbackReport>> {
    Ok(Json(state.pipeline().analyze_feedback().await?))
}
