//! Chat request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body of `POST /api/chat` and `POST /api/chat/stream`
///
/// Both fields are optional on the wire so that a missing field is reported
/// as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's question
    #[serde(default)]
    pub question: Option<String>,
    /// Document the question is about
    #[serde(default)]
    pub document_id: Option<String>,
}

/// A chat request whose required fields are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidChatRequest {
    pub question: String,
    pub document_id: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            document_id: Some(document_id.into()),
        }
    }

    /// Require a non-blank question and document id
    pub fn validate(self) -> Result<ValidChatRequest> {
        let question = self.question.filter(|q| !q.trim().is_empty());
        let document_id = self.document_id.filter(|d| !d.trim().is_empty());

        match (question, document_id) {
            (Some(question), Some(document_id)) => Ok(ValidChatRequest {
                question,
                document_id,
            }),
            _ => Err(Error::validation(r#"Missing "question" or "documentId"."#)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"question":"What is this?","documentId":"abc"}"#).unwrap();
        let valid = req.validate().unwrap();
        assert_eq!(valid.question, "What is this?");
        assert_eq!(valid.document_id, "abc");
    }

    #[test]
    fn test_validate_missing_fields() {
        let req: ChatRequest = serde_json::from_str(r#"{"question":"What?"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), r#"Missing "question" or "documentId"."#);

        let req = ChatRequest::new("   ", "abc");
        assert!(req.validate().is_err());
    }
}
