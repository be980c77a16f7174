//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{VectorMatch, VectorRecord};

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `PineconeStore`: Pinecone serverless index
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or overwrite vectors
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Find the `top_k` nearest vectors belonging to `document_id`
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        document_id: &str,
    ) -> Result<Vec<VectorMatch>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
