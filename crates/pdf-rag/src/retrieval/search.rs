//! Query-time passage retrieval

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::VectorMatch;

/// Embeds a question and fetches the closest passages of one document
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k: top_k.max(1),
        }
    }

    /// Retrieve the `top_k` passages of `document_id` most similar to `question`
    pub async fn retrieve(&self, question: &str, document_id: &str) -> Result<Vec<VectorMatch>> {
        tracing::info!("[{}] Embedding query: \"{}\"", document_id, question);
        let query_vector = self.embedder.embed_query(question).await?;

        tracing::info!("[{}] Querying {}...", document_id, self.store.name());
        let matches = self
            .store
            .query(&query_vector, self.top_k, document_id)
            .await?;

        tracing::info!("[{}] Found {} relevant chunks.", document_id, matches.len());
        Ok(matches)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

/// Distinct pages present in a set of matches, sorted
pub fn retrieved_pages(matches: &[VectorMatch]) -> Vec<u32> {
    let mut pages: Vec<u32> = matches.iter().map(|m| m.metadata.page_number).collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{ChunkMetadata, VectorRecord};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed_document(&self, _: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("documents are not embedded at query time"))
        }

        async fn embed_query(&self, _: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct CapturingStore {
        last_query: Mutex<Option<(usize, String)>>,
    }

    #[async_trait]
    impl VectorStoreProvider for CapturingStore {
        async fn upsert(&self, _: &[VectorRecord]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _: &[f32], top_k: usize, document_id: &str) -> Result<Vec<VectorMatch>> {
            *self.last_query.lock() = Some((top_k, document_id.to_string()));
            Ok(vec![vector_match(4), vector_match(2)])
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "capturing"
        }
    }

    fn vector_match(page: u32) -> VectorMatch {
        VectorMatch {
            id: format!("doc-chunk-{}", page),
            score: 0.9,
            metadata: ChunkMetadata {
                document_id: "doc".to_string(),
                text: format!("text on page {}", page),
                page_number: page,
            },
        }
    }

    #[tokio::test]
    async fn test_retrieve_passes_filter_and_top_k() {
        let store = Arc::new(CapturingStore::default());
        let retriever = Retriever::new(Arc::new(FixedEmbedder), store.clone(), 5);

        let matches = retriever.retrieve("What changed?", "doc").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(*store.last_query.lock(), Some((5, "doc".to_string())));
    }

    #[test]
    fn test_retrieved_pages() {
        let matches = vec![vector_match(9), vector_match(2), vector_match(9)];
        assert_eq!(retrieved_pages(&matches), vec![2, 9]);
    }
}
