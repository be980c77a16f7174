//! Page chunks and the vector records built from them

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A block of text extracted from a PDF, tagged with its page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfChunk {
    /// Extracted text (markdown when the parser produces it)
    pub text: String,
    /// 1-indexed page number, 0 when unknown
    pub page_number: u32,
}

impl PdfChunk {
    pub fn new(text: impl Into<String>, page_number: u32) -> Self {
        Self {
            text: text.into(),
            page_number,
        }
    }

    /// Whether the chunk carries any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Metadata stored next to every vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Owning document
    pub document_id: String,
    /// Chunk text, returned at query time to build the prompt context
    pub text: String,
    /// Page the chunk came from
    pub page_number: u32,
}

/// A vector ready to be upserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// `{document_id}-chunk-{index}`
    pub id: String,
    /// Embedding values
    pub values: Vec<f32>,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
}

impl VectorRecord {
    /// Build the record for the chunk at `index` within its document
    pub fn from_chunk(document_id: &Uuid, index: usize, chunk: &PdfChunk, values: Vec<f32>) -> Self {
        Self {
            id: Self::chunk_id(document_id, index),
            values,
            metadata: ChunkMetadata {
                document_id: document_id.to_string(),
                text: chunk.text.clone(),
                page_number: chunk.page_number,
            },
        }
    }

    /// Stable vector id for a chunk
    pub fn chunk_id(document_id: &Uuid, index: usize) -> String {
        format!("{}-chunk-{}", document_id, index)
    }
}

/// A retrieval hit from the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// Vector id
    pub id: String,
    /// Similarity score reported by the store
    pub score: f32,
    /// Stored metadata
    pub metadata: ChunkMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_chunk() {
        let doc_id = Uuid::new_v4();
        let chunk = PdfChunk::new("Revenue grew 12%.", 4);
        let record = VectorRecord::from_chunk(&doc_id, 107, &chunk, vec![0.1, 0.2]);

        assert_eq!(record.id, format!("{}-chunk-107", doc_id));
        assert_eq!(record.metadata.page_number, 4);
        assert_eq!(record.metadata.document_id, doc_id.to_string());
    }

    #[test]
    fn test_metadata_wire_names() {
        let meta = ChunkMetadata {
            document_id: "doc".to_string(),
            text: "hello".to_string(),
            page_number: 2,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["documentId"], "doc");
        assert_eq!(json["pageNumber"], 2);
    }

    #[test]
    fn test_has_text() {
        assert!(PdfChunk::new("x", 1).has_text());
        assert!(!PdfChunk::new(" \n\t", 1).has_text());
    }
}
