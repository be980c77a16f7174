//! Embed-and-store pipeline for parsed chunks

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{PdfChunk, VectorRecord};

/// Embeds chunks and writes them to the vector store in fixed-size batches
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    batch_size: usize,
}

impl IngestPipeline {
    /// Create a pipeline; a batch size of 0 is treated as 1
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed one batch, one request per chunk
    ///
    /// `batch_start` is the global index of the batch's first chunk and
    /// determines the vector ids.
    pub async fn embed_batch(
        &self,
        batch: &[PdfChunk],
        document_id: &Uuid,
        batch_start: usize,
    ) -> Result<Vec<VectorRecord>> {
        let mut records = Vec::with_capacity(batch.len());

        for (offset, chunk) in batch.iter().enumerate() {
            let index = batch_start + offset;
            let values = self.embedder.embed_document(&chunk.text).await.map_err(|e| {
                tracing::error!("[{}] Error embedding chunk {}: {}", document_id, index, e);
                e
            })?;
            records.push(VectorRecord::from_chunk(document_id, index, chunk, values));
        }

        Ok(records)
    }

    /// Embed and store all chunks, returning how many were stored
    ///
    /// Stops at the first failing batch. Batches stored before the failure
    /// are left in place.
    pub async fn process_and_store(&self, chunks: &[PdfChunk], document_id: &Uuid) -> Result<usize> {
        let total_batches = chunks.len().div_ceil(self.batch_size);

        for (batch_index, batch) in chunks.chunks(self.batch_size).enumerate() {
            let current = batch_index + 1;
            let batch_start = batch_index * self.batch_size;

            tracing::info!(
                "[{}] Processing batch {}/{} ({} chunks)...",
                document_id,
                current,
                total_batches,
                batch.len()
            );

            let result = async {
                let records = self.embed_batch(batch, document_id, batch_start).await?;
                self.store.upsert(&records).await
            }
            .await;

            if let Err(e) = result {
                tracing::error!("[{}] Error processing batch {}: {}", document_id, current, e);
                return Err(Error::batch(current, e.to_string()));
            }

            tracing::info!(
                "[{}] Batch {}/{} completed successfully.",
                document_id,
                current,
                total_batches
            );
        }

        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use crate::types::VectorMatch;

    struct CountingEmbedder {
        fail_on: Option<String>,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
            if self.fail_on.as_deref() == Some(text) {
                return Err(Error::embedding("quota exceeded"));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            self.embed_document(text).await
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        upserts: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl VectorStoreProvider for RecordingStore {
        async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
            self.upserts
                .lock()
                .push(records.iter().map(|r| r.id.clone()).collect());
            Ok(())
        }

        async fn query(&self, _: &[f32], _: usize, _: &str) -> Result<Vec<VectorMatch>> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn chunks(n: usize) -> Vec<PdfChunk> {
        (0..n)
            .map(|i| PdfChunk::new(format!("chunk text {}", i), (i / 2 + 1) as u32))
            .collect()
    }

    #[tokio::test]
    async fn test_batches_and_ids() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = IngestPipeline::new(
            Arc::new(CountingEmbedder { fail_on: None }),
            store.clone(),
            2,
        );
        let doc_id = Uuid::new_v4();

        let stored = pipeline.process_and_store(&chunks(5), &doc_id).await.unwrap();
        assert_eq!(stored, 5);

        let upserts = store.upserts.lock();
        assert_eq!(upserts.len(), 3);
        assert_eq!(upserts[0].len(), 2);
        assert_eq!(upserts[2].len(), 1);
        assert_eq!(upserts[1][0], format!("{}-chunk-2", doc_id));
        assert_eq!(upserts[2][0], format!("{}-chunk-4", doc_id));
    }

    #[tokio::test]
    async fn test_failure_names_batch_and_keeps_earlier_batches() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = IngestPipeline::new(
            Arc::new(CountingEmbedder {
                fail_on: Some("chunk text 3".to_string()),
            }),
            store.clone(),
            2,
        );

        let err = pipeline
            .process_and_store(&chunks(6), &Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to process batch 2: Embedding generation failed: quota exceeded"
        );
        assert_eq!(store.upserts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = IngestPipeline::new(
            Arc::new(CountingEmbedder { fail_on: None }),
            store.clone(),
            0,
        );
        assert_eq!(pipeline.process_and_store(&[], &Uuid::new_v4()).await.unwrap(), 0);
        assert!(store.upserts.lock().is_empty());
    }
}
