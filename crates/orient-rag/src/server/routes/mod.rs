//! HTTP routes for the question and feedback endpoints

pub mod ask;
pub mod feedback;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/feedback", post(feedback::submit_feedback))
        .route("/feedback/stats", get(feedback::feedback_stats))
        .route("/feedback/analysis", get(feedback::feedback_analysis))
}
