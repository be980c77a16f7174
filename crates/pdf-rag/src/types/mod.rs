//! Core types for the PDF chat pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{ChunkMetadata, PdfChunk, VectorMatch, VectorRecord};
pub use query::{ChatRequest, ValidChatRequest};
pub use response::{ChatResponse, ErrorResponseBody, StreamEvent, UploadResponse};
