//! RAG Server binary
//!
//! Run with: cargo run -p orient-rag --bin orient-rag-server [config.toml]

use std::path::PathBuf;

use orient_rag::{
    config::RagConfig,
    server::{state::AppState, RagServer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orient_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Orient RAG System                     ║
║         INPT Orientation Q&A with Answer Feedback         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Config file from the first argument or ORIENT_RAG_CONFIG
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("ORIENT_RAG_CONFIG").map(PathBuf::from));
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Vector index: {}", config.retrieval.index_path.display());
    tracing::info!("  - Feedback database: {}", config.feedback.db_path.display());

    let state = AppState::new(config)?;

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", state.config().llm.base_url);
    match state.pipeline().llm().health_check().await {
        Ok(true) => tracing::info!("Ollama is running"),
        _ => {
            tracing::warn!("Ollama not available at {}", state.config().llm.base_url);
            tracing::warn!("Questions will be answered with the fallback message until it is started:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!(
                "  2. Pull models: ollama pull {} && ollama pull {}",
                state.config().llm.embed_model,
                state.config().llm.model
            );
        }
    }

    let server = RagServer::with_state(state);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ask                - Ask a question");
    println!("  POST /feedback           - Like or dislike an answer");
    println!("  GET  /feedback/stats     - Feedback totals");
    println!("  GET  /feedback/analysis  - Feedback insights");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
