//! Pinecone vector store provider
//!
//! Talks to the index data plane directly (`/vectors/upsert`, `/query`).
//! Every vector carries `documentId` metadata, which queries filter on.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::VectorStoreProvider;
use crate::types::{ChunkMetadata, VectorMatch, VectorRecord};

/// Pinecone rejects upsert requests above this many vectors
const MAX_UPSERT_BATCH: usize = 1000;

/// Pinecone index client
pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_host: String,
    namespace: Option<String>,
    api_version: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    filter: serde_json::Value,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<StoredMetadata>,
}

/// Metadata as returned by a query; Pinecone hands numbers back as floats
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMetadata {
    document_id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    page_number: f64,
}

impl From<StoredMetadata> for ChunkMetadata {
    fn from(stored: StoredMetadata) -> Self {
        Self {
            document_id: stored.document_id,
            text: stored.text,
            page_number: stored.page_number.max(0.0) as u32,
        }
    }
}

impl PineconeStore {
    /// Create a client for the configured index host
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Missing PINECONE_API_KEY".to_string()))?;
        let host = config
            .index_host
            .clone()
            .ok_or_else(|| Error::Config("Missing PINECONE_INDEX_HOST".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            index_host: normalize_host(&host),
            namespace: config.namespace.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.index_host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::vector_db(format!(
            "Pinecone {} failed ({}): {}",
            action, status, body
        )))
    }
}

/// Pinecone hosts are shown without a scheme in the console
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Metadata filter restricting a query to one document
fn document_filter(document_id: &str) -> serde_json::Value {
    serde_json::json!({ "documentId": { "$eq": document_id } })
}

#[async_trait]
impl VectorStoreProvider for PineconeStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        for slice in records.chunks(MAX_UPSERT_BATCH) {
            let request = UpsertRequest {
                vectors: slice,
                namespace: self.namespace.as_deref(),
            };

            let response = self
                .post("/vectors/upsert")
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::vector_db(format!("Pinecone upsert request failed: {}", e)))?;
            Self::check(response, "upsert").await?;

            tracing::debug!("Upserted {} vectors", slice.len());
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        document_id: &str,
    ) -> Result<Vec<VectorMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            filter: document_filter(document_id),
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .post("/query")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone query request failed: {}", e)))?;
        let response = Self::check(response, "query").await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse Pinecone response: {}", e)))?;

        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(VectorMatch {
                    id: m.id,
                    score: m.score,
                    metadata: metadata.into(),
                })
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .post("/describe_index_stats")
            .json(&serde_json::json!({}))
            .send()
            .await;
        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("my-index-abc.svc.pinecone.io/"),
            "https://my-index-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5080"), "http://localhost:5080");
    }

    #[test]
    fn test_query_request_shape() {
        let vector = [0.5f32, 0.25];
        let request = QueryRequest {
            vector: &vector,
            top_k: 5,
            filter: document_filter("doc-1"),
            include_metadata: true,
            namespace: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 5);
        assert_eq!(json["includeMetadata"], true);
        assert_eq!(json["filter"]["documentId"]["$eq"], "doc-1");
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn test_query_response_drops_matches_without_metadata() {
        let parsed: QueryResponse = serde_json::from_str(
            r#"{"matches":[
                {"id":"d-chunk-0","score":0.91,"metadata":{"documentId":"d","text":"alpha","pageNumber":3}},
                {"id":"d-chunk-1","score":0.80},
                {"id":"d-chunk-2","score":0.70,"metadata":{"documentId":"d","text":"beta","pageNumber":7.0}}
            ],"namespace":""}"#,
        )
        .unwrap();
        assert_eq!(parsed.matches.len(), 3);
        assert!(parsed.matches[1].metadata.is_none());

        let pages: Vec<u32> = parsed
            .matches
            .into_iter()
            .filter_map(|m| m.metadata)
            .map(|m| ChunkMetadata::from(m).page_number)
            .collect();
        assert_eq!(pages, vec![3, 7]);
    }
}
