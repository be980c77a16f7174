//! Response bodies and stream events

use serde::{Deserialize, Serialize};

/// Answer from `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer
    pub answer: String,
    /// Cited page numbers, sorted and unique
    pub citations: Vec<u32>,
}

/// Result of `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Id to pass to the chat endpoints
    pub document_id: String,
    /// Original filename
    pub file_name: String,
    /// Number of chunks embedded and stored
    pub chunks_processed: usize,
    /// Human-readable status
    pub message: String,
}

impl UploadResponse {
    pub fn processed(document_id: String, file_name: String, chunks_processed: usize) -> Self {
        Self {
            document_id,
            file_name,
            chunks_processed,
            message: "PDF processed successfully".to_string(),
        }
    }
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Short error summary
    pub error: String,
    /// Underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// RFC 3339 time of failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorResponseBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            timestamp: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

/// One server-sent event on `POST /api/chat/stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// A piece of answer text
    Chunk { text: String },
    /// End of answer with the cited pages
    Done { citations: Vec<u32> },
    /// Generation failed; no further events follow
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_event_shapes() {
        let chunk = serde_json::to_string(&StreamEvent::Chunk {
            text: "Hi".to_string(),
        })
        .unwrap();
        assert_eq!(chunk, r#"{"type":"chunk","text":"Hi"}"#);

        let done = serde_json::to_string(&StreamEvent::Done {
            citations: vec![2, 9],
        })
        .unwrap();
        assert_eq!(done, r#"{"type":"done","citations":[2,9]}"#);

        let error = serde_json::to_string(&StreamEvent::Error {
            error: "Failed to get answer.".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(error, r#"{"type":"error","error":"Failed to get answer."}"#);
    }

    #[test]
    fn test_upload_response_camel_case() {
        let body = UploadResponse::processed("id-1".to_string(), "report.pdf".to_string(), 12);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["documentId"], "id-1");
        assert_eq!(json["fileName"], "report.pdf");
        assert_eq!(json["chunksProcessed"], 12);
        assert_eq!(json["message"], "PDF processed successfully");
    }

    #[test]
    fn test_error_body_omits_empty_fields() {
        let json = serde_json::to_string(&ErrorResponseBody::new("No file uploaded.")).unwrap();
        assert_eq!(json, r#"{"error":"No file uploaded."}"#);

        let body = ErrorResponseBody::new("PDF processing failed")
            .with_details("boom")
            .with_timestamp();
        assert!(body.timestamp.is_some());
        assert_eq!(body.details.as_deref(), Some("boom"));
    }
}
