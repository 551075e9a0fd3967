//! HTTP server for the question answering pipeline

pub mod routes;
pub mod state;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a new server and the pipeline behind it
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Serve an existing state
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state);

        tracing::info!("Starting RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let server = &self.state.config().server;
        format!("{}:{}", server.host, server.port)
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config().server.enable_cors;

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Health check endpoint, reporting whether the model server answers
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let llm = state.pipeline().llm();
    let llm_available = llm.health_check().await.unwrap_or(false);

    Json(json!({
        "status": "ok",
        "model": llm.model(),
        "llm_available": llm_available,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generation::FALLBACK_ANSWER;
    use crate::pipeline::tests::{pipeline, FixedRetriever, ScriptedLlm};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn router_with(llm: ScriptedLlm) -> Router {
        let pipeline = pipeline(
            Arc::new(FixedRetriever::new(&["INPT offers Cloud, Data and Cybersecurity."])),
            Arc::new(llm),
        );
        build_router(AppState::with_pipeline(RagConfig::default(), pipeline))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_id() {
        let router = router_with(ScriptedLlm::replying("Cloud, Data and Cybersecurity."));

        let (status, body) = send(&router, "POST", "/ask", Some(json!({"query": "Which branches?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Cloud, Data and Cybersecurity.");
        assert!(Uuid::parse_str(body["qa_id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_ask_empty_query() {
        let router = router_with(ScriptedLlm::replying("unused"));

        let (status, body) = send(&router, "POST", "/ask", Some(json!({"query": "  "}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Please ask a question about INPT branches.");
        assert!(body.get("qa_id").is_none());
    }

    #[tokio::test]
    async fn test_ask_with_llm_down_still_succeeds() {
        let router = router_with(ScriptedLlm::failing(|| GenerationError::Connect {
            url: "http://localhost:11434/api/chat".to_string(),
            message: "connection refused".to_string(),
        }));

        let (status, body) = send(&router, "POST", "/ask", Some(json!({"query": "Which branches?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_feedback_flow() {
        let router = router_with(ScriptedLlm::replying("Three."));

        for feedback in ["like", "like", "dislike"] {
            let (status, body) = send(
                &router,
                "POST",
                "/feedback",
                Some(json!({
                    "qa_id": Uuid::new_v4(),
                    "query": "How many branches?",
                    "response": "Three.",
                    "feedback": feedback
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "success");
        }

        let (status, stats) = send(&router, "GET", "/feedback/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats, json!({"likes": 2, "dislikes": 1, "total": 3}));

        let (status, report) = send(&router, "GET", "/feedback/analysis", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["stats"]["total"], 3);
        assert_eq!(report["disliked_queries"], json!(["How many branches?"]));
    }

    #[tokio::test]
    async fn test_feedback_rejects_unknown_sentiment() {
        let router = router_with(ScriptedLlm::replying("Three."));

        let (status, _) = send(
            &router,
            "POST",
            "/feedback",
            Some(json!({
                "qa_id": Uuid::new_v4(),
                "query": "q",
                "response": "r",
                "feedback": "meh"
            })),
        )
        .await;

        assert!(status.is_client_error());
        let (_, stats) = send(&router, "GET", "/feedback/stats", None).await;
        assert_eq!(stats["total"], 0);
    }

    #[tokio::test]
    async fn test_health() {
        let router = router_with(ScriptedLlm::replying("ok"));

        let (status, body) = send(&router, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "scripted-model");
        assert_eq!(body["llm_available"], true);
    }
}
