//! pdf-rag: chat with an uploaded PDF
//!
//! A retrieval-augmented generation backend. Uploaded PDFs are parsed into
//! page chunks, embedded and stored in a vector index namespaced by document.
//! Questions are answered from the most relevant pages, with page citations
//! checked against what was actually retrieved.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{PdfChunk, VectorMatch, VectorRecord},
    query::ChatRequest,
    response::{ChatResponse, StreamEvent, UploadResponse},
};
