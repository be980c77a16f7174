//! Provider abstractions for embeddings, LLM and vector storage
//!
//! Each external service sits behind a trait so the pipeline can be driven
//! against the hosted APIs in production and in-memory fakes in tests.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod pinecone;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiEmbedder, GeminiLlm};
pub use llm::{LlmProvider, TextStream};
pub use pinecone::PineconeStore;
pub use vector_store::VectorStoreProvider;
