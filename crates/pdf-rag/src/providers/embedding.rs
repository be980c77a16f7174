//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Documents and queries are embedded with different task types, so the
/// trait keeps the two entry points apart.
///
/// Implementations:
/// - `GeminiEmbedder`: Google Generative Language API (text-embedding-004)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a chunk of document text for storage
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a user question for retrieval
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions (768 for text-embedding-004)
    fn dimensions(&self) -> usize;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
