//! Error types for the PDF chat backend

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected request input (missing fields, bad upload)
    #[error("{0}")]
    Validation(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// The parser succeeded but produced no text
    #[error("No content could be extracted from the PDF.")]
    NoContent,

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Embedding or storing one ingestion batch failed
    #[error("Failed to process batch {batch}: {message}")]
    Batch { batch: usize, message: String },

    /// Vector database error
    #[error("Vector database error: {0}")]
    VectorDb(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a batch failure for the 1-based `batch`
    pub fn batch(batch: usize, message: impl Into<String>) -> Self {
        Self::Batch {
            batch,
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Whether this error came from turning the upload into text
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::FileParse { .. } | Self::NoContent)
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::FileParse { .. } | Self::NoContent => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::Config(_)
            | Self::Embedding(_)
            | Self::Batch { .. }
            | Self::VectorDb(_)
            | Self::Llm(_)
            | Self::Io(_)
            | Self::Http(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::file_parse("a.pdf", "broken").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(Error::NoContent.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            Error::batch(2, "quota").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::llm("quota").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(Error::NoContent.is_parse_error());
        assert!(Error::file_parse("a.pdf", "x").is_parse_error());
        assert!(!Error::embedding("x").is_parse_error());
    }
}
