//! Command-line interface: serve, ask once, inspect feedback
//!
//! Run with: cargo run -p orient-rag --bin orient-rag -- --help

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orient_rag::{
    config::RagConfig,
    learning::FeedbackAnalyzer,
    server::{state::AppState, RagServer},
    storage::FeedbackDb,
    RagPipeline,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "orient-rag")]
#[command(version, about = "Grounded Q&A over the INPT orientation knowledge base")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "ORIENT_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ask one question; read from stdin when omitted
    Ask {
        question: Option<String>,
    },
    /// Summarize stored feedback and export the report as JSON
    Analyze {
        /// Report destination (defaults to feedback.export_path)
        #[arg(long)]
        export: Option<PathBuf>,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print like/dislike totals
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "orient_rag=debug,tower_http=debug"
    } else {
        "orient_rag=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = RagConfig::load(cli.config.as_deref()).context("load configuration")?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let server = RagServer::with_state(AppState::new(config)?);
            println!("Serving on http://{}", server.address());
            server.start().await?;
        }
        Commands::Ask { question } => {
            let question = match question {
                Some(q) => q,
                None => read_question()?,
            };
            let pipeline = RagPipeline::from_config(&config)?;
            let response = pipeline.ask(&question).await;

            println!("\n\n---------------------\n\n");
            println!("{}", response.answer);
            if let Some(id) = response.interaction_id {
                println!("\n(interaction id: {})", id);
            }
        }
        Commands::Analyze { export, json } => {
            println!("Starting feedback analysis...");
            let db = open_feedback(&config)?;
            let report = FeedbackAnalyzer::analyze_store(&db)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", FeedbackAnalyzer::render(&report));
            }

            let path = export.unwrap_or_else(|| config.feedback.export_path.clone());
            FeedbackAnalyzer::export(&report, &path)?;
            println!("\nAnalysis exported to {}", path.display());
        }
        Commands::Stats => {
            let stats = open_feedback(&config)?.feedback_stats()?;
            println!("Likes: {}", stats.likes);
            println!("Dislikes: {}", stats.dislikes);
            println!("Total: {}", stats.total);
        }
    }

    Ok(())
}

fn read_question() -> Result<String> {
    print!("What do you want to know about INPT branches?\n\n");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read question from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn open_feedback(config: &RagConfig) -> Result<FeedbackDb> {
    FeedbackDb::new(&config.feedback.db_path)
        .with_context(|| format!("open {}", config.feedback.db_path.display()))
}
