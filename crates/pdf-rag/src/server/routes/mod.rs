//! API routes for the PDF chat server

pub mod chat;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for PDFs
        .route(
            "/upload",
            post(upload::upload_pdf).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/chat", post(chat::chat))
        .route("/chat/stream", post(chat::chat_stream))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "pdf-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Chat with an uploaded PDF using retrieval-augmented generation",
        "endpoints": {
            "POST /api/upload": "Upload a PDF (multipart field \"pdfFile\")",
            "POST /api/chat": "Ask a question about an uploaded PDF",
            "POST /api/chat/stream": "Ask a question and stream the answer as server-sent events",
            "GET /health": "Liveness check",
            "GET /ready": "Checks the embedding, vector and LLM services"
        }
    }))
}
