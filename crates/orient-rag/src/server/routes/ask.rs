//! Question endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /ask - Answer a question
///
/// Always 200: generation failures come back as the fallback answer.
pub async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Json<AskResponse> {
    Json(state.pipeline().ask(&request.query).await)
}
