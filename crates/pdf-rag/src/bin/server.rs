//! PDF chat server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server

use clap::Parser;
use pdf_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdf-rag-server", version, about = "Chat with your PDF")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "PDF_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Parser: {:?}", config.parser.backend);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM models: {} -> {}", config.llm.primary_model, config.llm.fallback_model);
    tracing::info!(
        "  - Vector index: {}",
        config.vector_db.index_host.as_deref().unwrap_or("(unset)")
    );
    tracing::info!("  - Top K: {}", config.retrieval.top_k);

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload      - Upload a PDF");
    println!("  POST /api/chat        - Ask a question");
    println!("  POST /api/chat/stream - Ask a question (streamed)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
